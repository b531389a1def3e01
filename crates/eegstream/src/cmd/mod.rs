use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use eegstream_packet::PacketFormat;
use eegstream_signal::DeviceInfo;

use crate::exit::{CliError, CliResult, INTERNAL, USAGE};
use crate::output::OutputFormat;

pub mod doctor;
pub mod info;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a FIFO, window the incoming stream and print epochs.
    Listen(ListenArgs),
    /// Stream synthetic samples into a listening FIFO.
    Send(SendArgs),
    /// Show packet and window geometry for a stream configuration.
    Info(InfoArgs),
    /// Run local environment health checks.
    Doctor(DoctorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Listen(args) => listen::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Info(args) => info::run(args, format),
        Command::Doctor(args) => doctor::run(args, format),
        Command::Version(args) => version::run(args, format),
    }
}

/// Stream description shared by every command that touches a FIFO.
#[derive(Args, Debug, Clone)]
pub struct StreamArgs {
    /// Device preset supplying channel count, sample rate and packet format.
    #[arg(long, default_value = "openbci8")]
    pub device: String,
    /// Packet format descriptor overriding the preset (e.g. "<4f").
    #[arg(long, value_name = "DESCRIPTOR")]
    pub packet: Option<String>,
    /// Sample rate in Hz overriding the preset.
    #[arg(long, value_name = "HZ")]
    pub rate: Option<f64>,
}

impl StreamArgs {
    /// Resolve the preset and apply overrides. `path` replaces the preset's
    /// FIFO location.
    pub fn device(&self, path: Option<&Path>) -> CliResult<DeviceInfo> {
        let mut device = DeviceInfo::preset(&self.device).ok_or_else(|| {
            CliError::usage(format!(
                "unknown device {:?} (known: {})",
                self.device,
                DeviceInfo::PRESETS.join(", ")
            ))
        })?;

        if let Some(descriptor) = &self.packet {
            let format = PacketFormat::parse(descriptor)
                .map_err(|err| CliError::usage(format!("invalid --packet: {err}")))?;
            device.channel_count = format.arity();
            device.format = descriptor.clone();
        }
        if let Some(rate) = self.rate {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(CliError::usage("--rate must be a positive number"));
            }
            device.sample_rate = rate;
        }
        if let Some(path) = path {
            device.fifo_path = path.to_path_buf();
        }
        Ok(device)
    }
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// FIFO path to create. Default: the device's well-known path.
    pub path: Option<PathBuf>,
    #[command(flatten)]
    pub stream: StreamArgs,
    /// Epoch length in seconds.
    #[arg(long, default_value = "1")]
    pub window: f64,
    /// Samples between two epochs. Default: one full window.
    #[arg(long)]
    pub step: Option<usize>,
    /// Channel mask, e.g. "1,0,1,1" or "1011".
    #[arg(long)]
    pub mask: Option<String>,
    /// Exit after printing N epochs.
    #[arg(long)]
    pub count: Option<usize>,
    /// Keep partial packets across reads instead of failing.
    #[arg(long)]
    pub carry_tail: bool,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// FIFO path of a running listener. Default: the device's well-known path.
    pub path: Option<PathBuf>,
    #[command(flatten)]
    pub stream: StreamArgs,
    /// Waveform to synthesise.
    #[arg(long, value_enum, default_value = "sine")]
    pub pattern: Pattern,
    /// Stop after N samples. Default: run until interrupted.
    #[arg(long)]
    pub count: Option<u64>,
    /// Connection attempts before giving up.
    #[arg(long, default_value = "10")]
    pub attempts: u32,
    /// Pause between connection attempts (e.g. 1s, 200ms).
    #[arg(long, default_value = "1s")]
    pub retry_delay: String,
    /// Send as fast as the pipe accepts instead of at the sample rate.
    #[arg(long)]
    pub no_pace: bool,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// FIFO path to report. Default: the device's well-known path.
    pub path: Option<PathBuf>,
    #[command(flatten)]
    pub stream: StreamArgs,
    /// Epoch length in seconds.
    #[arg(long, default_value = "1")]
    pub window: f64,
    /// Samples between two epochs. Default: one full window.
    #[arg(long)]
    pub step: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub struct DoctorArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Synthetic waveforms for `send`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Pattern {
    /// 10 Hz sine, one hertz higher per channel.
    Sine,
    /// 1 Hz sawtooth from 0 to 100.
    Ramp,
    /// The sample index on every channel.
    Counter,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::usage("duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

/// Parse `"1,0,1"`, `"true,false"` or the compact `"101"`.
pub fn parse_mask(input: &str) -> CliResult<Vec<bool>> {
    let tokens: Vec<&str> = if input.contains(',') {
        input.split(',').map(str::trim).collect()
    } else {
        input
            .char_indices()
            .map(|(i, c)| &input[i..i + c.len_utf8()])
            .collect()
    };
    if tokens.is_empty() {
        return Err(CliError::usage("mask must not be empty"));
    }
    tokens
        .into_iter()
        .map(|token| match token {
            "1" | "true" | "t" | "y" => Ok(true),
            "0" | "false" | "f" | "n" => Ok(false),
            other => Err(CliError::new(
                USAGE,
                format!("invalid mask entry {other:?} (use 1/0)"),
            )),
        })
        .collect()
}

/// Install a Ctrl-C handler clearing the returned flag.
pub fn stop_flag() -> CliResult<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let handler = running.clone();
    ctrlc::set_handler(move || {
        handler.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))?;
    Ok(running)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(packet: Option<&str>, rate: Option<f64>) -> StreamArgs {
        StreamArgs {
            device: "openbci8".to_string(),
            packet: packet.map(str::to_string),
            rate,
        }
    }

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn parse_mask_forms() {
        assert_eq!(parse_mask("1,0,1").unwrap(), vec![true, false, true]);
        assert_eq!(parse_mask("true, false").unwrap(), vec![true, false]);
        assert_eq!(parse_mask("0110").unwrap(), vec![false, true, true, false]);
        assert_eq!(parse_mask("1,2").unwrap_err().code, USAGE);
        assert!(parse_mask("").is_err());
    }

    #[test]
    fn packet_override_sets_channel_count() {
        let device = stream(Some("<3f"), Some(500.0)).device(None).unwrap();
        assert_eq!(device.channel_count, 3);
        assert_eq!(device.sample_rate, 500.0);
        assert_eq!(device.format, "<3f");
    }

    #[test]
    fn path_overrides_preset_fifo() {
        let device = stream(None, None)
            .device(Some(Path::new("/tmp/custom_fifo")))
            .unwrap();
        assert_eq!(device.fifo_path, PathBuf::from("/tmp/custom_fifo"));
        assert_eq!(device.channel_count, 8);
    }

    #[test]
    fn rejects_bad_overrides() {
        assert_eq!(stream(Some("8q?"), None).device(None).unwrap_err().code, USAGE);
        assert_eq!(stream(None, Some(0.0)).device(None).unwrap_err().code, USAGE);
        let unknown = StreamArgs {
            device: "cyton".to_string(),
            packet: None,
            rate: None,
        };
        assert_eq!(unknown.device(None).unwrap_err().code, USAGE);
    }
}
