use std::path::PathBuf;

use eegstream_epoch::MAX_WINDOW_VALUES;
use eegstream_packet::{DatalinkKind, PacketConfig, PacketError, PacketFormat};
use eegstream_transport::{fifo_path, FifoConfig};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SignalError};

/// Acquisition metadata shared by the producer and its consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    pub channel_count: usize,
    /// Samples per second.
    pub sample_rate: f64,
    /// Packet format descriptor, one field per channel.
    pub format: String,
    #[serde(default)]
    pub datalink: DatalinkKind,
    pub fifo_path: PathBuf,
}

impl DeviceInfo {
    /// Names accepted by [`DeviceInfo::preset`].
    pub const PRESETS: &'static [&'static str] = &["openbci8", "openbci16"];

    /// OpenBCI board, 8 channels at 250 Hz.
    pub fn openbci8() -> Self {
        Self {
            name: "openbci8".to_string(),
            channel_count: 8,
            sample_rate: 250.0,
            format: "8d".to_string(),
            datalink: DatalinkKind::Pipe,
            fifo_path: fifo_path("eegstream_openbci8"),
        }
    }

    /// OpenBCI board with daisy module, 16 channels at 125 Hz.
    pub fn openbci16() -> Self {
        Self {
            name: "openbci16".to_string(),
            channel_count: 16,
            sample_rate: 125.0,
            format: "16d".to_string(),
            datalink: DatalinkKind::Pipe,
            fifo_path: fifo_path("eegstream_openbci16"),
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "openbci8" => Some(Self::openbci8()),
            "openbci16" => Some(Self::openbci16()),
            _ => None,
        }
    }

    /// Samples in a window of `window` seconds: `round(sample_rate * window)`.
    ///
    /// The ring for the window must fit in [`MAX_WINDOW_VALUES`].
    pub fn epoch_len(&self, window: f64) -> Result<usize> {
        let samples = (self.sample_rate * window).round();
        let limit = MAX_WINDOW_VALUES / self.channel_count.max(1);
        if !samples.is_finite() || samples < 1.0 || samples > limit as f64 {
            return Err(SignalError::Window {
                sample_rate: self.sample_rate,
                window,
            });
        }
        Ok(samples as usize)
    }

    /// Packet settings for this device, checked against the channel count.
    pub fn packet_config(&self) -> Result<PacketConfig> {
        let format = PacketFormat::parse(&self.format).map_err(PacketError::from)?;
        if format.arity() != self.channel_count {
            return Err(SignalError::FormatMismatch {
                format: self.format.clone(),
                arity: format.arity(),
                channels: self.channel_count,
            });
        }
        let mut config = PacketConfig::new(format);
        config.datalink = self.datalink;
        Ok(config)
    }

    pub fn fifo_config(&self) -> FifoConfig {
        FifoConfig::new(&self.fifo_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_consistent() {
        for name in DeviceInfo::PRESETS {
            let device = DeviceInfo::preset(name).expect("listed preset exists");
            let packet = device.packet_config().expect("preset format matches channels");
            assert_eq!(packet.format.arity(), device.channel_count);
            assert_eq!(packet.format.packet_size(), device.channel_count * 8);
        }
        assert!(DeviceInfo::preset("cyton").is_none());
    }

    #[test]
    fn epoch_len_rounds() {
        let device = DeviceInfo::openbci8();
        assert_eq!(device.epoch_len(1.0).unwrap(), 250);
        assert_eq!(device.epoch_len(0.1).unwrap(), 25);
        assert_eq!(device.epoch_len(0.003).unwrap(), 1);
    }

    #[test]
    fn empty_window_is_rejected() {
        let device = DeviceInfo::openbci16();
        assert!(matches!(
            device.epoch_len(0.001),
            Err(SignalError::Window { .. })
        ));
        assert!(device.epoch_len(-1.0).is_err());
        assert!(device.epoch_len(f64::NAN).is_err());
    }

    #[test]
    fn oversized_window_is_rejected() {
        let device = DeviceInfo::openbci8();
        assert!(matches!(
            device.epoch_len(1e30),
            Err(SignalError::Window { .. })
        ));
        let limit = MAX_WINDOW_VALUES / device.channel_count;
        let largest = limit as f64 / device.sample_rate;
        assert_eq!(device.epoch_len(largest).unwrap(), limit);
        assert!(device.epoch_len(largest + 1.0).is_err());
    }

    #[test]
    fn mismatched_format_is_rejected() {
        let device = DeviceInfo {
            format: "4d".to_string(),
            ..DeviceInfo::openbci8()
        };
        assert!(matches!(
            device.packet_config(),
            Err(SignalError::FormatMismatch {
                arity: 4,
                channels: 8,
                ..
            })
        ));
    }

    #[test]
    fn deserializes_without_datalink() {
        let device: DeviceInfo = serde_json::from_str(
            r#"{"name":"bench","channel_count":2,"sample_rate":500.0,"format":"<2f","fifo_path":"/tmp/fifo_bench"}"#,
        )
        .unwrap();
        assert_eq!(device.datalink, DatalinkKind::Pipe);
        assert_eq!(device.packet_config().unwrap().format.packet_size(), 8);
    }
}
