use serde::Serialize;

use eegstream_signal::DeviceInfo;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat};

#[derive(Serialize)]
struct BuildInfo {
    name: &'static str,
    version: &'static str,
    target: &'static str,
    git_hash: &'static str,
    datalinks: &'static str,
    devices: String,
    /// Bytes one FIFO write can carry without interleaving.
    atomic_write_bytes: Option<usize>,
}

impl BuildInfo {
    fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            target: option_env!("EEGSTREAM_BUILD_TARGET").unwrap_or("unknown"),
            git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
            datalinks: "pipe",
            devices: DeviceInfo::PRESETS.join(", "),
            atomic_write_bytes: atomic_write_bytes(),
        }
    }
}

pub fn run(args: VersionArgs, format: OutputFormat) -> CliResult<i32> {
    let info = BuildInfo::current();
    if args.extended {
        print_report("Build Info", &info, format);
    } else {
        println!("{} {}", info.name, info.version);
    }
    Ok(SUCCESS)
}

#[cfg(unix)]
fn atomic_write_bytes() -> Option<usize> {
    Some(eegstream_transport::atomic_write_limit())
}

#[cfg(not(unix))]
fn atomic_write_bytes() -> Option<usize> {
    None
}
