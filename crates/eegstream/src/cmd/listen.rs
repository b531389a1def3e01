use std::sync::atomic::Ordering;
use std::time::Duration;

use eegstream_epoch::WindowConfig;
use eegstream_packet::{FramingPolicy, PacketReceiver};
use eegstream_signal::SignalInterface;
use tracing::info;

use crate::cmd::{parse_mask, stop_flag, ListenArgs};
use crate::exit::{packet_error, signal_error, CliResult, SUCCESS};
use crate::output::{print_epoch, OutputFormat};

/// Longest wait for a full window before the stop flag is checked again.
const STOP_CHECK_INTERVAL: Duration = Duration::from_millis(200);

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let device = args.stream.device(args.path.as_deref())?;
    let epoch_len = device
        .epoch_len(args.window)
        .map_err(|err| signal_error("invalid window", err))?;
    let step = args.step.unwrap_or(epoch_len);

    let mut packet = device
        .packet_config()
        .map_err(|err| signal_error("invalid device", err))?;
    if args.carry_tail {
        packet = packet.with_framing(FramingPolicy::CarryTail);
    }

    let receiver = PacketReceiver::bind(&packet, &device.fifo_config())
        .map_err(|err| packet_error("bind failed", err))?;
    let window = WindowConfig::new(epoch_len)
        .with_step(step)
        .with_timeout(STOP_CHECK_INTERVAL);
    let mut interface = SignalInterface::with_config(receiver, device, window)
        .map_err(|err| signal_error("invalid window", err))?;

    if let Some(mask) = &args.mask {
        interface
            .set_mask(parse_mask(mask)?)
            .map_err(|err| signal_error("invalid mask", err))?;
    }

    let running = stop_flag()?;
    info!(
        path = %interface.device().fifo_path.display(),
        epoch_len,
        step,
        "listening"
    );

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        if args.count.is_some_and(|count| printed >= count) {
            break;
        }
        let Some(epoch) = interface
            .pull()
            .map_err(|err| signal_error("receive failed", err))?
        else {
            continue;
        };
        print_epoch(&epoch, printed, format);
        printed = printed.saturating_add(1);
    }

    let stats = interface.stats();
    info!(
        epochs = stats.epochs,
        slow_epochs = stats.slow_epochs,
        samples = stats.samples_received,
        dropped = stats.samples_dropped,
        "listener stopped"
    );
    Ok(SUCCESS)
}
