use std::path::PathBuf;
use std::time::Duration;

/// Number of times a sender tries to open the FIFO before giving up.
pub const N_CONNECT_ATTEMPTS: u32 = 10;

/// Pause between two sender connect attempts.
pub const DEFAULT_CONNECT_DELAY: Duration = Duration::from_secs(1);

/// Permission mode for FIFOs created by a listener.
pub const DEFAULT_FIFO_MODE: u32 = 0o600;

/// Where a FIFO lives and how the two ends rendezvous on it.
///
/// There is no default path; both ends are handed the same config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FifoConfig {
    /// Filesystem path of the named pipe.
    pub path: PathBuf,
    /// Sender open attempts before [`TransportError::NoReceiver`](crate::TransportError::NoReceiver).
    pub connect_attempts: u32,
    /// Fixed delay between sender open attempts.
    pub connect_delay: Duration,
    /// Permission bits applied by the listener after `mkfifo`.
    pub mode: u32,
}

impl FifoConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            connect_attempts: N_CONNECT_ATTEMPTS,
            connect_delay: DEFAULT_CONNECT_DELAY,
            mode: DEFAULT_FIFO_MODE,
        }
    }

    /// Override the attempt budget (at least one attempt is always made).
    pub fn with_connect_attempts(mut self, attempts: u32) -> Self {
        self.connect_attempts = attempts.max(1);
        self
    }

    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }
}

/// Conventional FIFO location for an application: `<tmp>/fifo_<app>`.
pub fn fifo_path(app: &str) -> PathBuf {
    std::env::temp_dir().join(format!("fifo_{app}"))
}
