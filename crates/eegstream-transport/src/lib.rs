//! Non-blocking named-pipe (FIFO) datalink.
//!
//! This is the lowest layer of eegstream. A [`FifoListener`] creates the
//! FIFO and reads from it, a [`FifoSender`] rendezvous with it and writes.
//! Neither side ever blocks: a full pipe shows up as a zero-length write and
//! an empty pipe as an empty read.
//!
//! Everything above (packets, epochs) is written against the
//! [`ByteSink`] / [`ByteSource`] traits defined here.

pub mod config;
pub mod error;
pub mod traits;

#[cfg(unix)]
pub mod listener;
#[cfg(unix)]
pub mod sender;

pub use config::{
    fifo_path, FifoConfig, DEFAULT_CONNECT_DELAY, DEFAULT_FIFO_MODE, N_CONNECT_ATTEMPTS,
};
pub use error::{Result, TransportError};
pub use traits::{ByteSink, ByteSource, ByteTransport, Role};

#[cfg(unix)]
pub use listener::FifoListener;
#[cfg(unix)]
pub use sender::{atomic_write_limit, FifoSender};
