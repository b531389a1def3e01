//! Minimal consumer: half-second epochs from the OpenBCI FIFO, every 50
//! samples, with the odd channels masked out.
//!
//! Run with:
//!   cargo run --example epoch-monitor

use eegstream::packet::PacketReceiver;
use eegstream::signal::{DeviceInfo, SignalInterface};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let device = DeviceInfo::openbci8();
    let receiver = PacketReceiver::bind(&device.packet_config()?, &device.fifo_config())?;
    eprintln!("Listening on {}", device.fifo_path.display());

    let mut interface = SignalInterface::new(receiver, device, 0.5, 50)?;
    let mask = (0..interface.n_channels()).map(|ch| ch % 2 == 0).collect();
    interface.set_mask(mask)?;

    for epoch in interface.epochs().take(20) {
        let epoch = epoch?;
        let means: Vec<String> = epoch
            .rows()
            .iter()
            .map(|row| format!("{:+.2}", row.iter().sum::<f64>() / row.len() as f64))
            .collect();
        println!(
            "channels={:?} slow={} means=[{}]",
            epoch.channel_ids(),
            epoch.is_slow(),
            means.join(", ")
        );
    }
    Ok(())
}
