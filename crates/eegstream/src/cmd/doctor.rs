use serde::Serialize;

use eegstream_signal::DeviceInfo;

use crate::cmd::DoctorArgs;
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::OutputFormat;

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Info,
    Skip,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(_args: DoctorArgs, format: OutputFormat) -> CliResult<i32> {
    let checks = vec![
        platform_datalink_check(),
        fifo_roundtrip_check(),
        atomic_write_check(),
        device_presets_check(),
        compiled_features_check(),
    ];

    let has_fail = checks.iter().any(|c| matches!(c.status, CheckStatus::Fail));
    let output = DoctorOutput {
        checks,
        overall: if has_fail { "fail" } else { "pass" },
    };

    print_doctor(&output, format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("eegstream doctor\n");
            for c in &output.checks {
                println!(
                    "  [{:>4}] {:<20} {}",
                    status_text(c.status),
                    c.name,
                    c.detail
                );
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Warn => "WARN",
        CheckStatus::Info => "INFO",
        CheckStatus::Skip => "SKIP",
    }
}

fn platform_datalink_check() -> CheckResult {
    if cfg!(unix) {
        CheckResult::new("platform_datalink", CheckStatus::Pass, "named pipes available")
    } else {
        CheckResult::new(
            "platform_datalink",
            CheckStatus::Fail,
            "named-pipe datalink requires a Unix platform",
        )
    }
}

/// Create, open and release a FIFO in the temp directory.
fn fifo_roundtrip_check() -> CheckResult {
    #[cfg(unix)]
    {
        use eegstream_transport::{FifoConfig, FifoListener};

        let path = std::env::temp_dir().join(format!(
            "fifo_eegstream_doctor_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or_default()
        ));
        let detail_dir = std::env::temp_dir().display().to_string();

        match FifoListener::bind(&FifoConfig::new(&path)) {
            Ok(listener) => {
                drop(listener);
                if path.exists() {
                    let _ = std::fs::remove_file(&path);
                    CheckResult::new(
                        "temp_dir_fifo",
                        CheckStatus::Fail,
                        format!("{} was not removed on release", path.display()),
                    )
                } else {
                    CheckResult::new(
                        "temp_dir_fifo",
                        CheckStatus::Pass,
                        format!("mkfifo/open/unlink in {detail_dir} succeeded"),
                    )
                }
            }
            Err(err) => CheckResult::new(
                "temp_dir_fifo",
                CheckStatus::Fail,
                format!("mkfifo in {detail_dir} failed: {err}"),
            ),
        }
    }

    #[cfg(not(unix))]
    {
        CheckResult::new(
            "temp_dir_fifo",
            CheckStatus::Skip,
            "fifo check not available on this platform",
        )
    }
}

fn atomic_write_check() -> CheckResult {
    #[cfg(unix)]
    {
        CheckResult::new(
            "pipe_buf",
            CheckStatus::Info,
            format!(
                "writes up to {} bytes are atomic",
                eegstream_transport::atomic_write_limit()
            ),
        )
    }

    #[cfg(not(unix))]
    {
        CheckResult::new("pipe_buf", CheckStatus::Skip, "no pipe semantics")
    }
}

fn device_presets_check() -> CheckResult {
    let mut sizes = Vec::new();
    for name in DeviceInfo::PRESETS {
        let Some(device) = DeviceInfo::preset(name) else {
            continue;
        };
        match device.packet_config() {
            Ok(packet) => sizes.push((*name, packet.format.packet_size())),
            Err(err) => {
                return CheckResult::new(
                    "device_presets",
                    CheckStatus::Fail,
                    format!("{name}: {err}"),
                )
            }
        }
    }

    let detail = sizes
        .iter()
        .map(|(name, size)| format!("{name}={size}B"))
        .collect::<Vec<_>>()
        .join(", ");
    let limit = atomic_limit();
    if sizes.iter().any(|(_, size)| *size > limit) {
        CheckResult::new(
            "device_presets",
            CheckStatus::Warn,
            format!("{detail} (some packets exceed {limit}B and may be split)"),
        )
    } else {
        CheckResult::new("device_presets", CheckStatus::Pass, detail)
    }
}

#[cfg(unix)]
fn atomic_limit() -> usize {
    eegstream_transport::atomic_write_limit()
}

#[cfg(not(unix))]
fn atomic_limit() -> usize {
    usize::MAX
}

fn compiled_features_check() -> CheckResult {
    let mut features = Vec::new();
    if cfg!(feature = "signal") {
        features.push("signal");
    }
    if cfg!(feature = "cli") {
        features.push("cli");
    }
    CheckResult::new("compiled_features", CheckStatus::Info, features.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctor_output_has_overall_status() {
        let output = DoctorOutput {
            checks: vec![CheckResult::new("x", CheckStatus::Pass, "ok")],
            overall: "pass",
        };
        let json = serde_json::to_string(&output).expect("doctor output should serialize");
        assert!(json.contains("\"overall\":\"pass\""));
        assert!(json.contains("\"status\":\"pass\""));
    }

    #[test]
    fn presets_fit_in_one_write() {
        let check = device_presets_check();
        assert!(matches!(check.status, CheckStatus::Pass));
        assert!(check.detail.contains("openbci8=64B"));
    }

    #[cfg(unix)]
    #[test]
    fn fifo_roundtrip_passes() {
        let check = fifo_roundtrip_check();
        assert!(matches!(check.status, CheckStatus::Pass), "{}", check.detail);
    }
}
