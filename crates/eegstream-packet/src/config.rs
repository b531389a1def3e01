use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PacketError, Result};
use crate::format::PacketFormat;

/// Datalink a packet endpoint is carried over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatalinkKind {
    /// Named pipe (FIFO).
    #[default]
    Pipe,
}

impl DatalinkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DatalinkKind::Pipe => "pipe",
        }
    }
}

impl FromStr for DatalinkKind {
    type Err = PacketError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pipe" => Ok(DatalinkKind::Pipe),
            other => Err(PacketError::UnknownDatalink(other.to_string())),
        }
    }
}

impl fmt::Display for DatalinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a receiver does with bytes that do not complete a packet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FramingPolicy {
    /// A partial packet is a fatal [`PacketError::Framing`] error.
    #[default]
    Strict,
    /// A partial packet is kept and completed by the next receive.
    CarryTail,
}

/// Everything both ends of a packet stream must agree on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketConfig {
    pub format: PacketFormat,
    pub datalink: DatalinkKind,
    pub framing: FramingPolicy,
}

impl PacketConfig {
    pub fn new(format: PacketFormat) -> Self {
        Self {
            format,
            datalink: DatalinkKind::default(),
            framing: FramingPolicy::default(),
        }
    }

    /// Build from the textual settings pair, e.g. `("8d", "pipe")`.
    pub fn parse(format: &str, datalink: &str) -> Result<Self> {
        Ok(Self {
            format: PacketFormat::parse(format)?,
            datalink: datalink.parse()?,
            framing: FramingPolicy::default(),
        })
    }

    pub fn with_framing(mut self, framing: FramingPolicy) -> Self {
        self.framing = framing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_settings_pair() {
        let config = PacketConfig::parse("8d", "pipe").unwrap();
        assert_eq!(config.format.packet_size(), 64);
        assert_eq!(config.datalink, DatalinkKind::Pipe);
        assert_eq!(config.framing, FramingPolicy::Strict);
    }

    #[test]
    fn unknown_datalink_is_rejected() {
        let err = PacketConfig::parse("8d", "socket").unwrap_err();
        assert!(matches!(err, PacketError::UnknownDatalink(kind) if kind == "socket"));
    }

    #[test]
    fn bad_format_is_rejected() {
        let err = PacketConfig::parse("8w", "pipe").unwrap_err();
        assert!(matches!(err, PacketError::Format(_)));
    }

    #[test]
    fn serde_names() {
        assert_eq!(
            serde_json::to_string(&DatalinkKind::Pipe).unwrap(),
            "\"pipe\""
        );
        assert_eq!(
            serde_json::from_str::<FramingPolicy>("\"carry-tail\"").unwrap(),
            FramingPolicy::CarryTail
        );
    }
}
