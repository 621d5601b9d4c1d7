// src/config.rs
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::AttendanceError;

// --- Configuration & Constants ---

pub const ENV_PREFIX: &str = "ATTENDANCE_";
pub const DEFAULT_SUMMARY_FILE: &str = "employee_attendance_summary.csv";
pub const DEFAULT_VISITORS_FILE: &str = "visitors_without_seat.csv";
pub const DEFAULT_DETAIL_FILE: &str = "detail_sheet.csv";

/// What to do with a day whose last "out" precedes its first "in".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NegativeSpanPolicy {
    /// Report the negative duration as computed.
    #[default]
    Keep,
    /// Report zero worked time for the day.
    Clamp,
    /// Remove the day from the detail sheet and the roll-up.
    Drop,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    #[serde(default)]
    pub negative_span: NegativeSpanPolicy,
    #[serde(default)]
    pub timestamp_formats: Vec<String>,
    #[serde(default = "default_summary_file")]
    pub summary_file: String,
    #[serde(default = "default_visitors_file")]
    pub visitors_file: String,
    #[serde(default = "default_detail_file")]
    pub detail_file: String,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_summary_file() -> String {
    DEFAULT_SUMMARY_FILE.to_string()
}

fn default_visitors_file() -> String {
    DEFAULT_VISITORS_FILE.to_string()
}

fn default_detail_file() -> String {
    DEFAULT_DETAIL_FILE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            negative_span: NegativeSpanPolicy::default(),
            timestamp_formats: Vec::new(),
            summary_file: default_summary_file(),
            visitors_file: default_visitors_file(),
            detail_file: default_detail_file(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AttendanceError> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        Ok(envy::prefixed(ENV_PREFIX).from_env::<Config>()?)
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, AttendanceError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(ENV_PREFIX).from_iter::<_, Config>(vars)?)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.out_dir.join(&self.summary_file)
    }

    pub fn visitors_path(&self) -> PathBuf {
        self.out_dir.join(&self.visitors_file)
    }

    pub fn detail_path(&self) -> PathBuf {
        self.out_dir.join(&self.detail_file)
    }
}
