use std::fmt;
use std::io;

use eegstream_epoch::EpochError;
use eegstream_packet::PacketError;
use eegstream_signal::SignalError;
use eegstream_transport::TransportError;

pub const SUCCESS: i32 = 0;
#[allow(dead_code)]
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound | io::ErrorKind::BrokenPipe => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Create { source, .. }
        | TransportError::Open { source, .. }
        | TransportError::Io(source) => io_error(context, source),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn packet_error(context: &str, err: PacketError) -> CliError {
    match err {
        PacketError::Transport(err) => transport_error(context, err),
        PacketError::Format(_) | PacketError::UnknownDatalink(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        PacketError::Arity { .. } | PacketError::Value { .. } | PacketError::Framing { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

pub fn epoch_error(context: &str, err: EpochError) -> CliError {
    match err {
        EpochError::Source(err) => packet_error(context, err),
        EpochError::ChannelMismatch { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        other => CliError::new(USAGE, format!("{context}: {other}")),
    }
}

pub fn signal_error(context: &str, err: SignalError) -> CliError {
    match err {
        SignalError::Packet(err) => packet_error(context, err),
        SignalError::Epoch(err) => epoch_error(context, err),
        other => CliError::new(USAGE, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn missing_receiver_is_a_transport_error() {
        let err = TransportError::NoReceiver {
            path: PathBuf::from("/tmp/fifo_x"),
            attempts: 1,
        };
        let cli = packet_error("connect failed", PacketError::Transport(err));
        assert_eq!(cli.code, TRANSPORT_ERROR);
        assert!(cli.message.starts_with("connect failed: no receiver"));
    }

    #[test]
    fn broken_stream_is_invalid_data() {
        let err = EpochError::Source(PacketError::Framing {
            remainder: 3,
            packet_size: 8,
        });
        assert_eq!(signal_error("receive failed", err.into()).code, DATA_INVALID);
    }

    #[test]
    fn bad_configuration_is_usage() {
        let err = SignalError::MaskLength {
            expected: 8,
            got: 3,
        };
        assert_eq!(signal_error("invalid mask", err).code, USAGE);
        let err = EpochError::InvalidStep {
            step: 0,
            epoch_len: 4,
        };
        assert_eq!(epoch_error("invalid window", err).code, USAGE);
    }

    #[test]
    fn permission_denied_keeps_its_code() {
        let err = TransportError::Create {
            path: PathBuf::from("/root/fifo"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert_eq!(transport_error("bind failed", err).code, PERMISSION_DENIED);
    }
}
