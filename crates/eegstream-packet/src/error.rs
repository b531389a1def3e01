use eegstream_transport::TransportError;

/// Errors raised while parsing a packet format descriptor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The descriptor declares no fields.
    #[error("packet format {0:?} declares no fields")]
    Empty(String),

    /// A character that is not a known format code.
    #[error("unknown format code {code:?} at position {position}")]
    UnknownCode { code: char, position: usize },

    /// A repeat count that is not followed by a format code.
    #[error("repeat count without a format code in {0:?}")]
    DanglingCount(String),

    /// A repeat count that overflows.
    #[error("repeat count too large in {0:?}")]
    CountTooLarge(String),
}

/// Errors that can occur while sending or receiving packets.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    /// Invalid format descriptor.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// Datalink error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The number of values does not match the format.
    #[error("packet needs {expected} values, got {got}")]
    Arity { expected: usize, got: usize },

    /// A value cannot be represented by its field type.
    #[error("value {index} does not fit field '{code}': {reason}")]
    Value {
        index: usize,
        code: char,
        reason: String,
    },

    /// The received byte run is not a whole number of packets. The stream
    /// can no longer be interpreted.
    #[error("broken packet: {remainder} trailing bytes (packet size {packet_size})")]
    Framing {
        remainder: usize,
        packet_size: usize,
    },

    /// Unsupported datalink kind in a packet configuration.
    #[error("unknown datalink type {0:?}")]
    UnknownDatalink(String),
}

pub type Result<T> = std::result::Result<T, PacketError>;
