//! Sliding-window epochs over a packet stream.
//!
//! The [`Windower`] pulls samples from a [`SampleSource`] (normally a
//! packet receiver), keeps the most recent `epoch_len` of them in a
//! [`RingBuffer`] and hands out channel-major [`Epoch`] snapshots every
//! `step` samples. When the consumer falls behind, old samples are dropped
//! so that every epoch is as fresh as possible.

pub mod config;
pub mod epoch;
pub mod error;
pub mod ring;
pub mod source;
pub mod windower;

pub use config::{WindowConfig, DEFAULT_PULL_CHUNK, MAX_WINDOW_VALUES, SLEEP_TIMEOUT};
pub use epoch::{Epoch, Pace};
pub use error::{EpochError, Result};
pub use ring::RingBuffer;
pub use source::SampleSource;
pub use windower::{Epochs, WindowStats, Windower};
