use eegstream_packet::PacketError;

/// Errors that can occur while windowing a sample stream.
#[derive(Debug, thiserror::Error)]
pub enum EpochError {
    /// The epoch length is zero.
    #[error("epoch length must be positive")]
    ZeroEpochLength,

    /// The ring buffer for this window would exceed
    /// [`MAX_WINDOW_VALUES`](crate::MAX_WINDOW_VALUES).
    #[error("window of {epoch_len} samples x {n_channels} channels is too large")]
    WindowTooLarge { epoch_len: usize, n_channels: usize },

    /// The step is zero or larger than the epoch.
    #[error("step {step} must be between 1 and the epoch length {epoch_len}")]
    InvalidStep { step: usize, epoch_len: usize },

    /// A selected channel does not exist in the stream.
    #[error("channel {channel} out of range ({n_channels} channels)")]
    ChannelOutOfRange { channel: usize, n_channels: usize },

    /// A sample has the wrong number of values.
    #[error("sample has {got} channels, expected {expected}")]
    ChannelMismatch { expected: usize, got: usize },

    /// Error from the packet layer below.
    #[error("source error: {0}")]
    Source(#[from] PacketError),
}

pub type Result<T> = std::result::Result<T, EpochError>;
