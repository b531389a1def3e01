//! Mock acquisition daemon: streams an 8-channel sine into the OpenBCI FIFO.
//!
//! Run the consumer first:
//!   cargo run --example epoch-monitor
//!
//! Then, in another terminal:
//!   cargo run --example mock-daemon

use std::f64::consts::TAU;
use std::thread;
use std::time::{Duration, Instant};

use eegstream::packet::PacketSender;
use eegstream::signal::DeviceInfo;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let device = DeviceInfo::openbci8();
    let mut sender = PacketSender::connect(&device.packet_config()?, &device.fifo_config())?;
    eprintln!("Streaming to {}", device.fifo_path.display());

    let period = Duration::try_from_secs_f64(1.0 / device.sample_rate)?;
    let start = Instant::now();
    for n in 0u64.. {
        let t = n as f64 / device.sample_rate;
        let sample: Vec<f64> = (0..device.channel_count)
            .map(|ch| 50.0 * (TAU * (8.0 + ch as f64) * t).sin())
            .collect();

        // A full pipe drops this sample; the consumer only wants fresh data.
        if sender.send(&sample)? == 0 {
            eprintln!("pipe full at sample {n}");
        }

        let due = start + period.mul_f64((n + 1) as f64);
        if let Some(wait) = due.checked_duration_since(Instant::now()) {
            thread::sleep(wait);
        }
    }
    Ok(())
}
