// src/timestamp.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime};

// Badge exports seen in the wild. `%.f` also accepts a missing fraction.
static DATE_TIME_FORMATS: [&str; 16] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S%.f %p",
    "%m/%d/%Y %I:%M %p",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%d-%b-%Y %H:%M:%S%.f",
    "%d-%b-%Y %H:%M",
    "%d-%b-%Y %I:%M:%S %p",
    "%d-%b-%Y %I:%M %p",
];

static DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Lenient naive-local timestamp parsing. Failure yields `None`, never an error.
#[derive(Debug, Clone, Default)]
pub struct TimestampParser {
    extra_formats: Vec<String>,
}

impl TimestampParser {
    /// `extra_formats` are tried before the built-in list.
    pub fn new(extra_formats: Vec<String>) -> Self {
        Self { extra_formats }
    }

    pub fn parse(&self, raw: &str) -> Option<NaiveDateTime> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }

        let formats = self
            .extra_formats
            .iter()
            .map(String::as_str)
            .chain(DATE_TIME_FORMATS.iter().copied());
        for format in formats {
            if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
                return Some(ts);
            }
        }

        // Offsets are dropped: wall-clock time as printed by the reader.
        if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
            return Some(ts.naive_local());
        }

        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    }
}
