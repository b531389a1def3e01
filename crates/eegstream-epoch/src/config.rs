use std::time::Duration;

/// Pause between two polls while waiting for a full window.
pub const SLEEP_TIMEOUT: Duration = Duration::from_millis(1);

/// Samples requested from the source per pull.
pub const DEFAULT_PULL_CHUNK: usize = 256;

/// Most values (samples times channels) a ring buffer may hold, 512 MiB of
/// `f64`.
pub const MAX_WINDOW_VALUES: usize = 1 << 26;

/// Windowing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    /// Samples per epoch.
    pub epoch_len: usize,
    /// Samples the window advances between two epochs.
    pub step: usize,
    /// Channel indices to keep, in output order. `None` keeps all.
    pub channels: Option<Vec<usize>>,
    /// Sleep quantum of the wait loop in [`Windower::get_epoch`](crate::Windower::get_epoch).
    pub poll_interval: Duration,
    /// Give up waiting for a full window after this long. `None` waits
    /// indefinitely.
    pub timeout: Option<Duration>,
    /// Samples requested per source pull.
    pub pull_chunk: usize,
}

impl WindowConfig {
    /// Window of `epoch_len` samples advancing one sample at a time.
    pub fn new(epoch_len: usize) -> Self {
        Self {
            epoch_len,
            step: 1,
            channels: None,
            poll_interval: SLEEP_TIMEOUT,
            timeout: None,
            pull_chunk: DEFAULT_PULL_CHUNK,
        }
    }

    pub fn with_step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }

    pub fn with_channels(mut self, channels: Vec<usize>) -> Self {
        self.channels = Some(channels);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_pull_chunk(mut self, chunk: usize) -> Self {
        self.pull_chunk = chunk.max(1);
        self
    }
}
