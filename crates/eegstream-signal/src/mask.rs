use crate::error::{Result, SignalError};

/// Boolean per-channel selector owned by the consumer.
///
/// Defaults to all channels on. Every update is length-checked and raises a
/// "changed" flag a renderer can poll with [`take_changed`](Self::take_changed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskController {
    mask: Vec<bool>,
    changed: bool,
}

impl MaskController {
    pub fn new(n_channels: usize) -> Self {
        Self {
            mask: vec![true; n_channels],
            changed: false,
        }
    }

    /// Start from an explicit mask.
    pub fn with_mask(n_channels: usize, mask: Vec<bool>) -> Result<Self> {
        let mut controller = Self::new(n_channels);
        controller.set_mask(mask)?;
        controller.changed = false;
        Ok(controller)
    }

    pub fn n_channels(&self) -> usize {
        self.mask.len()
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Replace the whole mask.
    pub fn set_mask(&mut self, mask: Vec<bool>) -> Result<()> {
        if mask.len() != self.mask.len() {
            return Err(SignalError::MaskLength {
                expected: self.mask.len(),
                got: mask.len(),
            });
        }
        self.mask = mask;
        self.changed = true;
        Ok(())
    }

    /// Toggle a single channel.
    pub fn set_channel(&mut self, channel: usize, enabled: bool) -> Result<()> {
        let n_channels = self.mask.len();
        let slot = self
            .mask
            .get_mut(channel)
            .ok_or(SignalError::ChannelOutOfRange {
                channel,
                n_channels,
            })?;
        *slot = enabled;
        self.changed = true;
        Ok(())
    }

    /// Indices of enabled channels.
    pub fn selected(&self) -> Vec<usize> {
        self.mask
            .iter()
            .enumerate()
            .filter_map(|(i, on)| on.then_some(i))
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.mask.iter().filter(|on| **on).count()
    }

    /// Whether the mask changed since the last call.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_all_channels() {
        let controller = MaskController::new(3);
        assert_eq!(controller.mask(), &[true, true, true]);
        assert_eq!(controller.selected_count(), 3);
    }

    #[test]
    fn set_mask_updates_selection() {
        let mut controller = MaskController::new(3);
        controller.set_mask(vec![true, false, true]).unwrap();
        assert_eq!(controller.selected(), vec![0, 2]);
        assert!(controller.take_changed());
        assert!(!controller.take_changed());
    }

    #[test]
    fn wrong_length_is_rejected_and_mask_kept() {
        let mut controller = MaskController::new(3);
        let err = controller.set_mask(vec![true, false]).unwrap_err();
        assert!(matches!(
            err,
            SignalError::MaskLength {
                expected: 3,
                got: 2
            }
        ));
        assert_eq!(controller.mask(), &[true, true, true]);
        assert!(!controller.take_changed());

        assert!(MaskController::with_mask(2, vec![true; 4]).is_err());
    }

    #[test]
    fn toggle_single_channel() {
        let mut controller = MaskController::new(2);
        controller.set_channel(1, false).unwrap();
        assert_eq!(controller.mask(), &[true, false]);
        assert!(matches!(
            controller.set_channel(2, true),
            Err(SignalError::ChannelOutOfRange { channel: 2, .. })
        ));
    }
}
