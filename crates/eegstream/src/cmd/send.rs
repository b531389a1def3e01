use std::f64::consts::TAU;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use eegstream_packet::{FieldType, PacketSender, Value};
use serde::Serialize;
use tracing::{debug, info};

use crate::cmd::{parse_duration, stop_flag, Pattern, SendArgs};
use crate::exit::{packet_error, signal_error, CliError, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat};

/// Pause before retrying a write the full pipe refused.
const BACKOFF: Duration = Duration::from_millis(1);

/// Slowest pacing accepted for `--rate`.
const MAX_PERIOD: Duration = Duration::from_secs(3600);

#[derive(Serialize)]
struct SendReport {
    path: String,
    format: String,
    pattern: String,
    samples_sent: u64,
    bytes_sent: u64,
    stalls: u64,
    elapsed_ms: u128,
}

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let device = args.stream.device(args.path.as_deref())?;
    let packet = device
        .packet_config()
        .map_err(|err| signal_error("invalid device", err))?;
    let period = sample_period(device.sample_rate)?;
    let retry_delay = parse_duration(&args.retry_delay)?;
    let fifo = device
        .fifo_config()
        .with_connect_attempts(args.attempts)
        .with_connect_delay(retry_delay);

    let mut sender =
        PacketSender::connect(&packet, &fifo).map_err(|err| packet_error("connect failed", err))?;
    let kinds: Vec<FieldType> = sender.format().field_types().collect();

    let running = stop_flag()?;
    info!(path = %device.fifo_path.display(), pattern = ?args.pattern, "streaming");

    let start = Instant::now();
    let mut sent = 0u64;
    let mut bytes = 0u64;
    let mut stalls = 0u64;
    'stream: while running.load(Ordering::SeqCst) && args.count.is_none_or(|count| sent < count) {
        let values = synthesize(args.pattern, sent, &kinds, device.sample_rate);
        loop {
            let written = sender
                .send(&values)
                .map_err(|err| packet_error("send failed", err))?;
            if written > 0 {
                bytes += written as u64;
                break;
            }
            stalls += 1;
            if !running.load(Ordering::SeqCst) {
                break 'stream;
            }
            thread::sleep(BACKOFF);
        }
        sent += 1;

        if !args.no_pace {
            let due = start + period.mul_f64(sent as f64);
            if let Some(wait) = due.checked_duration_since(Instant::now()) {
                thread::sleep(wait);
            }
        }
    }
    debug!(sent, stalls, "producer stopped");

    let report = SendReport {
        path: device.fifo_path.display().to_string(),
        format: device.format.clone(),
        pattern: format!("{:?}", args.pattern).to_lowercase(),
        samples_sent: sent,
        bytes_sent: bytes,
        stalls,
        elapsed_ms: start.elapsed().as_millis(),
    };
    print_report("Send summary", &report, format);
    Ok(SUCCESS)
}

/// One sample of `pattern` at index `n`, typed per field.
fn synthesize(pattern: Pattern, n: u64, kinds: &[FieldType], rate: f64) -> Vec<Value> {
    let t = n as f64 / rate;
    kinds
        .iter()
        .enumerate()
        .map(|(channel, kind)| {
            let v = match pattern {
                Pattern::Sine => 100.0 * (TAU * (10.0 + channel as f64) * t).sin(),
                Pattern::Ramp => 100.0 * t.fract(),
                Pattern::Counter => n as f64,
            };
            typed(v, *kind)
        })
        .collect()
}

/// Integer fields wrap around their range, so a counter on `"8b"` cycles
/// through -128..=127 instead of overflowing. Negative values on unsigned
/// fields are clamped to zero first.
fn typed(v: f64, kind: FieldType) -> Value {
    if kind.is_float() {
        return Value::Float(v);
    }
    let span = 1i128 << (kind.width() * 8);
    let v = v.round() as i128;
    if kind.is_signed() {
        let min = -(span / 2);
        Value::Int(((v - min).rem_euclid(span) + min) as i64)
    } else {
        Value::UInt(v.max(0).rem_euclid(span) as u64)
    }
}

/// Time between two samples at `rate` Hz.
fn sample_period(rate: f64) -> CliResult<Duration> {
    Duration::try_from_secs_f64(1.0 / rate)
        .ok()
        .filter(|period| *period <= MAX_PERIOD)
        .ok_or_else(|| {
            CliError::usage(format!(
                "--rate {rate} is too low (at most {}s between samples)",
                MAX_PERIOD.as_secs()
            ))
        })
}
