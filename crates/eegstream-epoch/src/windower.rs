use std::num::NonZeroUsize;
use std::time::Instant;

use tracing::{debug, warn};

use crate::config::{WindowConfig, MAX_WINDOW_VALUES};
use crate::epoch::{Epoch, Pace};
use crate::error::{EpochError, Result};
use crate::ring::RingBuffer;
use crate::source::SampleSource;

/// Counters describing how the stream has been consumed so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowStats {
    /// Epochs handed out.
    pub epochs: u64,
    /// Epochs produced while the consumer was behind.
    pub slow_epochs: u64,
    /// Samples pulled from the source.
    pub samples_received: u64,
    /// Samples overwritten in the ring before they were part of any epoch
    /// advance.
    pub samples_dropped: u64,
}

/// Turns a sample stream into sliding-window epochs.
///
/// The ring buffer holds at most `epoch_len` samples. Each emitted epoch
/// advances the window by `step` samples. If `step` or more samples arrived
/// while the consumer was busy, everything but the newest `epoch_len`
/// samples has already been overwritten: the epoch is marked
/// [`Pace::Slow`] and a "slow pipeline" warning is logged.
pub struct Windower<S> {
    source: S,
    ring: RingBuffer,
    config: WindowConfig,
    selection: Vec<usize>,
    stats: WindowStats,
    scratch: Vec<f64>,
}

impl<S: SampleSource> Windower<S> {
    /// Validate `config` against the source and allocate the ring buffer.
    pub fn new(source: S, config: WindowConfig) -> Result<Self> {
        let capacity = NonZeroUsize::new(config.epoch_len).ok_or(EpochError::ZeroEpochLength)?;
        if config.step == 0 || config.step > config.epoch_len {
            return Err(EpochError::InvalidStep {
                step: config.step,
                epoch_len: config.epoch_len,
            });
        }

        let n_channels = source.n_channels();
        if config
            .epoch_len
            .checked_mul(n_channels.max(1))
            .is_none_or(|values| values > MAX_WINDOW_VALUES)
        {
            return Err(EpochError::WindowTooLarge {
                epoch_len: config.epoch_len,
                n_channels,
            });
        }

        let selection = match &config.channels {
            Some(channels) => {
                if let Some(&channel) = channels.iter().find(|&&c| c >= n_channels) {
                    return Err(EpochError::ChannelOutOfRange {
                        channel,
                        n_channels,
                    });
                }
                channels.clone()
            }
            None => (0..n_channels).collect(),
        };

        debug!(
            epoch_len = config.epoch_len,
            step = config.step,
            n_channels,
            "windower ready"
        );

        Ok(Self {
            source,
            ring: RingBuffer::new(n_channels, capacity),
            config,
            selection,
            stats: WindowStats::default(),
            scratch: Vec::with_capacity(n_channels),
        })
    }

    /// Wait for the next epoch.
    ///
    /// Polls the source every `poll_interval` until a full window is
    /// buffered. Returns `Ok(None)` only when `config.timeout` is set and
    /// expires first.
    pub fn get_epoch(&mut self) -> Result<Option<Epoch>> {
        let started = Instant::now();
        loop {
            if let Some(epoch) = self.try_epoch()? {
                return Ok(Some(epoch));
            }
            if let Some(timeout) = self.config.timeout {
                if started.elapsed() >= timeout {
                    return Ok(None);
                }
            }
            std::thread::sleep(self.config.poll_interval);
        }
    }

    /// One non-blocking pass: drain the source, then emit an epoch if the
    /// window is full.
    pub fn try_epoch(&mut self) -> Result<Option<Epoch>> {
        let pulled = self.drain()?;
        if !self.ring.is_full() {
            return Ok(None);
        }

        let pace = if pulled >= self.config.step {
            Pace::Slow
        } else {
            Pace::OnTime
        };

        let rows = self.ring.snapshot(&self.selection);
        self.ring.pop_front(self.config.step);

        self.stats.epochs += 1;
        if pace == Pace::Slow {
            self.stats.slow_epochs += 1;
            warn!(pulled, step = self.config.step, "slow pipeline");
        }

        Ok(Some(Epoch::new(rows, self.selection.clone(), pace)))
    }

    /// Unbounded iterator over epochs. Ends only if a timeout is configured
    /// and expires.
    pub fn epochs(&mut self) -> Epochs<'_, S> {
        Epochs { windower: self }
    }

    /// Forget all buffered samples.
    pub fn reset(&mut self) {
        self.ring.clear();
    }

    /// Samples currently buffered.
    pub fn buffered(&self) -> usize {
        self.ring.len()
    }

    /// Channels per emitted epoch.
    pub fn n_channels(&self) -> usize {
        self.selection.len()
    }

    pub fn stats(&self) -> WindowStats {
        self.stats
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Borrow the sample source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutably borrow the sample source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Consume the windower and return the source.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Pull until the source comes back short. Returns the sample count.
    fn drain(&mut self) -> Result<usize> {
        let chunk = self.config.pull_chunk.max(1);
        let mut pulled = 0usize;
        loop {
            let batch = self.source.pull(chunk)?;
            let n = batch.len();
            for sample in &batch {
                if sample.len() != self.ring.n_channels() {
                    return Err(EpochError::ChannelMismatch {
                        expected: self.ring.n_channels(),
                        got: sample.len(),
                    });
                }
                self.scratch.clear();
                self.scratch.extend(sample.iter().map(|v| v.as_f64()));
                if self.ring.push(&self.scratch) {
                    self.stats.samples_dropped += 1;
                }
            }
            self.stats.samples_received += n as u64;
            pulled += n;
            if n < chunk {
                return Ok(pulled);
            }
        }
    }
}

/// Iterator returned by [`Windower::epochs`].
pub struct Epochs<'a, S> {
    windower: &'a mut Windower<S>,
}

impl<S: SampleSource> Iterator for Epochs<'_, S> {
    type Item = Result<Epoch>;

    fn next(&mut self) -> Option<Self::Item> {
        self.windower.get_epoch().transpose()
    }
}
