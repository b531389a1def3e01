//! Streaming biosignal acquisition over named pipes.
//!
//! A producer pushes fixed-format multi-channel samples into a FIFO, a
//! consumer windows them into overlapping epochs and hands those to
//! visualisers or detectors through a channel mask.
//!
//! # Crate Structure
//!
//! - [`transport`]: non-blocking FIFO sender and listener
//! - [`packet`]: fixed-size packet codec over the datalink
//! - [`epoch`]: ring buffer and sliding-window epoch extraction
//! - [`signal`]: device metadata, channel mask and the consumer interface
//!   (behind the `signal` feature)

/// Re-export transport types.
pub mod transport {
    pub use eegstream_transport::*;
}

/// Re-export packet types.
pub mod packet {
    pub use eegstream_packet::*;
}

/// Re-export windowing types.
pub mod epoch {
    pub use eegstream_epoch::*;
}

/// Re-export consumer-side types (requires `signal` feature).
#[cfg(feature = "signal")]
pub mod signal {
    pub use eegstream_signal::*;
}
