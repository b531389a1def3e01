use serde::Serialize;

use crate::cmd::InfoArgs;
use crate::exit::{signal_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_report, OutputFormat};

#[derive(Serialize)]
struct InfoOutput {
    device: String,
    fifo_path: String,
    datalink: String,
    format: String,
    byte_order: String,
    channel_count: usize,
    packet_size: usize,
    sample_rate: f64,
    bytes_per_second: f64,
    window_seconds: f64,
    epoch_len: usize,
    step: usize,
    epochs_per_second: f64,
    /// Packets a single write can carry without interleaving.
    packets_per_atomic_write: Option<usize>,
}

pub fn run(args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let device = args.stream.device(args.path.as_deref())?;
    let packet = device
        .packet_config()
        .map_err(|err| signal_error("invalid device", err))?;
    let epoch_len = device
        .epoch_len(args.window)
        .map_err(|err| signal_error("invalid window", err))?;
    let step = args.step.unwrap_or(epoch_len);
    if step == 0 || step > epoch_len {
        return Err(CliError::new(
            USAGE,
            format!("--step must be between 1 and {epoch_len}"),
        ));
    }

    let packet_size = packet.format.packet_size();
    let out = InfoOutput {
        device: device.name.clone(),
        fifo_path: device.fifo_path.display().to_string(),
        datalink: packet.datalink.to_string(),
        format: packet.format.descriptor().to_string(),
        byte_order: format!("{:?}", packet.format.byte_order()).to_lowercase(),
        channel_count: device.channel_count,
        packet_size,
        sample_rate: device.sample_rate,
        bytes_per_second: device.sample_rate * packet_size as f64,
        window_seconds: args.window,
        epoch_len,
        step,
        epochs_per_second: device.sample_rate / step as f64,
        packets_per_atomic_write: atomic_packets(packet_size),
    };

    print_report("Stream Info", &out, format);
    Ok(SUCCESS)
}

#[cfg(unix)]
fn atomic_packets(packet_size: usize) -> Option<usize> {
    Some(eegstream_transport::atomic_write_limit() / packet_size)
}

#[cfg(not(unix))]
fn atomic_packets(_packet_size: usize) -> Option<usize> {
    None
}
