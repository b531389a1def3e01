#![cfg(all(unix, feature = "cli"))]

use std::process::{Command, Output};

fn eegstream(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_eegstream"))
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("command should run")
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be one JSON object")
}

#[test]
fn info_reports_preset_geometry() {
    let output = eegstream(&["--format", "json", "info"]);
    assert!(output.status.success());
    let info = json(&output);
    assert_eq!(info["device"], "openbci8");
    assert_eq!(info["channel_count"], 8);
    assert_eq!(info["packet_size"], 64);
    assert_eq!(info["epoch_len"], 250);
    assert_eq!(info["step"], 250);
}

#[test]
fn info_applies_overrides() {
    let output = eegstream(&[
        "--format", "json", "info", "/tmp/fifo_custom", "--packet", ">3f", "--rate", "500",
        "--window", "0.5", "--step", "50",
    ]);
    assert!(output.status.success());
    let info = json(&output);
    assert_eq!(info["fifo_path"], "/tmp/fifo_custom");
    assert_eq!(info["channel_count"], 3);
    assert_eq!(info["packet_size"], 12);
    assert_eq!(info["byte_order"], "big");
    assert_eq!(info["epoch_len"], 250);
    assert_eq!(info["epochs_per_second"], 10.0);
}

#[test]
fn info_rejects_step_longer_than_window() {
    let output = eegstream(&["info", "--window", "0.1", "--step", "100"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn unknown_device_is_usage_error() {
    let output = eegstream(&["info", "--device", "cyton"]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("openbci8"), "stderr: {stderr}");
}

#[test]
fn empty_window_is_usage_error() {
    let output = eegstream(&["info", "--rate", "100", "--window", "0.001"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn oversized_window_is_usage_error() {
    let output = eegstream(&["info", "--window", "1e30"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn send_rejects_rate_too_low_to_pace() {
    let output = eegstream(&["send", "/tmp/fifo_eegstream_unused", "--rate", "1e-300"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn doctor_reports_checks() {
    let output = eegstream(&["--format", "json", "doctor"]);
    let report = json(&output);
    let checks = report["checks"].as_array().expect("checks should be a list");
    assert!(checks.iter().any(|c| c["name"] == "temp_dir_fifo"));
    assert_eq!(report["overall"], "pass");
    assert!(output.status.success());
}

#[test]
fn version_prints_crate_version() {
    let output = eegstream(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("eegstream {}", env!("CARGO_PKG_VERSION")));
}
