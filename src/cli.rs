// src/cli.rs
use clap::Parser;
use std::path::PathBuf;

use atwork_attendance::config::{Config, NegativeSpanPolicy};

#[derive(Parser, Debug)]
#[command(name = "atwork-attendance")]
#[command(version)]
#[command(
    about = "Summarize badge punches against the seating roster",
    long_about = None
)]
pub struct Cli {
    /// Seating roster CSV
    #[arg(long, value_name = "CSV")]
    pub seating: PathBuf,

    /// Badge punch in/out CSV
    #[arg(long, value_name = "CSV")]
    pub punch: PathBuf,

    /// Directory for the three output CSV files (overrides ATTENDANCE_OUT_DIR)
    #[arg(long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Handling of days where the last out precedes the first in
    #[arg(long = "negative-span", value_enum)]
    pub negative_span: Option<NegativeSpanPolicy>,

    /// Extra chrono format for punch timestamps, tried before the built-ins (repeatable)
    #[arg(long = "timestamp-format", value_name = "FMT")]
    pub timestamp_formats: Vec<String>,

    /// Write a JSON run report (column bindings, skipped rows) to this path
    #[arg(long, value_name = "JSON")]
    pub report: Option<PathBuf>,

    /// Also print the three tables to stdout
    #[arg(long)]
    pub print: bool,
}

impl Cli {
    /// Flags win over environment values; timestamp formats from both are kept,
    /// flag formats first.
    pub fn apply_to(&self, mut config: Config) -> Config {
        if let Some(out_dir) = &self.out_dir {
            config.out_dir = out_dir.clone();
        }
        if let Some(policy) = self.negative_span {
            config.negative_span = policy;
        }
        if !self.timestamp_formats.is_empty() {
            let mut formats = self.timestamp_formats.clone();
            formats.append(&mut config.timestamp_formats);
            config.timestamp_formats = formats;
        }
        config
    }
}
