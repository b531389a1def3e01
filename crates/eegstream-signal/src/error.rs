use eegstream_epoch::EpochError;
use eegstream_packet::PacketError;

/// Errors raised at the consumer boundary.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// A mask whose length differs from the channel count.
    #[error("mask has {got} entries, expected {expected}")]
    MaskLength { expected: usize, got: usize },

    /// A channel index past the end of the mask.
    #[error("channel {channel} out of range ({n_channels} channels)")]
    ChannelOutOfRange { channel: usize, n_channels: usize },

    /// Window length and sample rate give an empty or oversized epoch.
    #[error("window of {window}s at {sample_rate} Hz gives no usable epoch length")]
    Window { sample_rate: f64, window: f64 },

    /// The stream's channel count differs from the device's.
    #[error("device has {device} channels but the stream carries {stream}")]
    ChannelCount { device: usize, stream: usize },

    /// Packet format arity differs from the device's channel count.
    #[error("format {format:?} has {arity} fields but the device has {channels} channels")]
    FormatMismatch {
        format: String,
        arity: usize,
        channels: usize,
    },

    /// Packet layer error.
    #[error("packet error: {0}")]
    Packet(#[from] PacketError),

    /// Windowing error.
    #[error("epoch error: {0}")]
    Epoch(#[from] EpochError),
}

pub type Result<T> = std::result::Result<T, SignalError>;
