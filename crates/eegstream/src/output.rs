use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use eegstream_epoch::{Epoch, Pace};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct EpochOutput<'a> {
    index: usize,
    samples: usize,
    channels: &'a [usize],
    pace: &'static str,
    rows: &'a [Vec<f64>],
    timestamp: String,
}

pub fn print_epoch(epoch: &Epoch, index: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EpochOutput {
                index,
                samples: epoch.len(),
                channels: epoch.channel_ids(),
                pace: pace_name(epoch.pace()),
                rows: epoch.rows(),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "MIN", "MAX", "MEAN", "LAST"]);
            for (id, row) in epoch.channel_ids().iter().zip(epoch.rows()) {
                let stats = RowStats::of(row);
                table.add_row(vec![
                    id.to_string(),
                    format!("{:.3}", stats.min),
                    format!("{:.3}", stats.max),
                    format!("{:.3}", stats.mean),
                    format!("{:.3}", stats.last),
                ]);
            }
            println!(
                "epoch {index} ({} samples, {})",
                epoch.len(),
                pace_name(epoch.pace())
            );
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "epoch={index} samples={} channels={:?} pace={}",
                epoch.len(),
                epoch.channel_ids(),
                pace_name(epoch.pace())
            );
            for (id, row) in epoch.channel_ids().iter().zip(epoch.rows()) {
                let stats = RowStats::of(row);
                println!(
                    "  ch{id:<3} mean={:.3} min={:.3} max={:.3}",
                    stats.mean, stats.min, stats.max
                );
            }
        }
    }
}

/// Print a flat report (`info`, `send` summary) as a JSON object or a
/// two-column table.
pub fn print_report<T: Serialize>(title: &str, report: &T, format: OutputFormat) {
    let value = serde_json::to_value(report).unwrap_or(serde_json::Value::Null);
    match format {
        OutputFormat::Json => println!("{value}"),
        OutputFormat::Table | OutputFormat::Pretty => {
            let serde_json::Value::Object(fields) = value else {
                println!("{value}");
                return;
            };
            if matches!(format, OutputFormat::Pretty) {
                println!("{title}:");
                for (key, field) in &fields {
                    println!("  {:<22} {}", format!("{key}:"), plain(field));
                }
                return;
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (key, field) in &fields {
                table.add_row(vec![key.clone(), plain(field)]);
            }
            println!("{title}");
            println!("{table}");
        }
    }
}

pub fn pace_name(pace: Pace) -> &'static str {
    match pace {
        Pace::OnTime => "on-time",
        Pace::Slow => "slow",
    }
}

struct RowStats {
    min: f64,
    max: f64,
    mean: f64,
    last: f64,
}

impl RowStats {
    fn of(row: &[f64]) -> Self {
        let min = row.iter().copied().fold(f64::INFINITY, f64::min);
        let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = if row.is_empty() {
            f64::NAN
        } else {
            row.iter().sum::<f64>() / row.len() as f64
        };
        Self {
            min,
            max,
            mean,
            last: row.last().copied().unwrap_or(f64::NAN),
        }
    }
}

fn plain(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_stats() {
        let stats = RowStats::of(&[1.0, -2.0, 4.0]);
        assert_eq!(stats.min, -2.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.mean, 1.0);
        assert_eq!(stats.last, 4.0);
    }

    #[test]
    fn epoch_json_shape() {
        let epoch = Epoch::new(vec![vec![1.0, 2.0]], vec![3], Pace::Slow);
        let out = EpochOutput {
            index: 0,
            samples: epoch.len(),
            channels: epoch.channel_ids(),
            pace: pace_name(epoch.pace()),
            rows: epoch.rows(),
            timestamp: "0".to_string(),
        };
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("\"channels\":[3]"));
        assert!(json.contains("\"pace\":\"slow\""));
        assert!(json.contains("\"rows\":[[1.0,2.0]]"));
    }
}
