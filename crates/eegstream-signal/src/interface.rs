use eegstream_epoch::{Epoch, SampleSource, WindowConfig, WindowStats, Windower};
use tracing::debug;

use crate::device::DeviceInfo;
use crate::error::{Result, SignalError};
use crate::mask::MaskController;

/// The only view GUI and detector code has of the stream.
pub struct SignalInterface<S> {
    windower: Windower<S>,
    device: DeviceInfo,
    mask: MaskController,
    last: Option<Epoch>,
}

impl<S: SampleSource> SignalInterface<S> {
    /// Window the stream into epochs of `window` seconds advancing by `step`
    /// samples.
    pub fn new(source: S, device: DeviceInfo, window: f64, step: usize) -> Result<Self> {
        let epoch_len = device.epoch_len(window)?;
        Self::with_config(source, device, WindowConfig::new(epoch_len).with_step(step))
    }

    /// Use an explicit window configuration. Channel selection is the mask's
    /// job, so `config.channels` is ignored.
    pub fn with_config(source: S, device: DeviceInfo, mut config: WindowConfig) -> Result<Self> {
        if source.n_channels() != device.channel_count {
            return Err(SignalError::ChannelCount {
                device: device.channel_count,
                stream: source.n_channels(),
            });
        }
        config.channels = None;

        debug!(device = %device.name, epoch_len = config.epoch_len, "signal interface ready");
        Ok(Self {
            windower: Windower::new(source, config)?,
            mask: MaskController::new(device.channel_count),
            device,
            last: None,
        })
    }

    pub fn n_channels(&self) -> usize {
        self.device.channel_count
    }

    pub fn epoch_len(&self) -> usize {
        self.windower.config().epoch_len
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    pub fn mask(&self) -> &[bool] {
        self.mask.mask()
    }

    /// Replace the channel mask; its length must equal [`n_channels`](Self::n_channels).
    pub fn set_mask(&mut self, mask: Vec<bool>) -> Result<()> {
        self.mask.set_mask(mask)
    }

    pub fn set_channel(&mut self, channel: usize, enabled: bool) -> Result<()> {
        self.mask.set_channel(channel, enabled)
    }

    /// True once after each mask change.
    pub fn take_mask_changed(&mut self) -> bool {
        self.mask.take_changed()
    }

    pub fn mask_controller(&self) -> &MaskController {
        &self.mask
    }

    pub fn mask_controller_mut(&mut self) -> &mut MaskController {
        &mut self.mask
    }

    /// Wait for the next epoch and return it restricted to masked channels.
    pub fn pull(&mut self) -> Result<Option<Epoch>> {
        let Some(epoch) = self.windower.get_epoch()? else {
            return Ok(None);
        };
        let masked = epoch.masked(self.mask.mask());
        self.last = Some(epoch);
        Ok(Some(masked))
    }

    /// The most recent epoch, restricted to the current mask.
    pub fn last(&self) -> Option<Epoch> {
        self.last
            .as_ref()
            .map(|epoch| epoch.masked(self.mask.mask()))
    }

    pub fn stats(&self) -> WindowStats {
        self.windower.stats()
    }

    /// Mutably borrow the sample source (the packet receiver).
    pub fn source_mut(&mut self) -> &mut S {
        self.windower.source_mut()
    }

    /// Unbounded iterator of masked epochs.
    pub fn epochs(&mut self) -> impl Iterator<Item = Result<Epoch>> + '_ {
        std::iter::from_fn(move || self.pull().transpose())
    }
}
