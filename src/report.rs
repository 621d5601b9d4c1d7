// src/report.rs
use chrono::{Duration, NaiveDateTime};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::{info, warn};

use crate::attendance::{Classification, DayAttendance, EmployeeSummary, IngestStats};
use crate::config::NegativeSpanPolicy;
use crate::schema::{ColumnBinding, SchemaAmbiguity, SeatingSchema};
use crate::table::Table;

// --- Output Column Names ---

pub const COL_EMPLOYEE_ID: &str = "EMPLOYEE_ID_CLEAN";
pub const COL_NAME: &str = "NAME";
pub const COL_DATE: &str = "DATE";
pub const COL_FIRST_IN: &str = "First In";
pub const COL_LAST_OUT: &str = "Last Out";
pub const COL_TOTAL_TIME: &str = "Total Time";
pub const COL_MISSING_PUNCH: &str = "Missing Punch";
pub const COL_DAYS_VISITED: &str = "Days_Visited";
pub const COL_TOTAL_HOURS: &str = "Total_Hours";

// --- Formatting ---

/// Decimal hours as `HH:MM`. Minutes round half-to-even and 60 carries into the hour.
pub fn format_hours(hours: Decimal) -> String {
    let magnitude = hours.abs();
    let mut whole = magnitude.trunc().to_i64().unwrap_or(0);
    let mut minutes = ((magnitude - magnitude.trunc()) * dec!(60))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .to_i64()
        .unwrap_or(0);
    if minutes == 60 {
        whole += 1;
        minutes = 0;
    }

    let sign = if hours.is_sign_negative() && (whole > 0 || minutes > 0) {
        "-"
    } else {
        ""
    };
    format!("{}{:02}:{:02}", sign, whole, minutes)
}

/// Worked time as `H:MM:SS`; sub-second remainders are truncated.
pub fn format_duration_hms(duration: Duration) -> String {
    let total_seconds = duration.num_seconds();
    let sign = if total_seconds < 0 { "-" } else { "" };
    let seconds = total_seconds.unsigned_abs();
    format!(
        "{}{}:{:02}:{:02}",
        sign,
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

pub fn format_clock(ts: NaiveDateTime) -> String {
    ts.format("%I:%M:%S %p").to_string()
}

/// Raw decimal hours for the visitors sheet, trailing zeros dropped.
pub fn format_decimal_hours(hours: Decimal) -> String {
    hours.normalize().to_string()
}

// --- Output Tables ---

/// One row per roster entry: serial (if bound), seat id, seat name (if bound),
/// days visited and `HH:MM` hours. Bound columns keep their normalized header.
pub fn seated_summary_table(schema: &SeatingSchema, classification: &Classification) -> Table {
    let mut headers = Vec::with_capacity(5);
    if let Some(serial) = &schema.serial_number {
        headers.push(serial.header.clone());
    }
    headers.push(schema.employee_id.header.clone());
    if let Some(name) = &schema.display_name {
        headers.push(name.header.clone());
    }
    headers.push(COL_DAYS_VISITED.to_string());
    headers.push(COL_TOTAL_HOURS.to_string());

    let mut table = Table::new(headers);
    for seated in &classification.seated {
        let mut row = Vec::with_capacity(5);
        if schema.serial_number.is_some() {
            row.push(seated.seat.serial_number.clone().unwrap_or_default());
        }
        row.push(seated.seat.employee_id.clone());
        if schema.display_name.is_some() {
            row.push(seated.seat.display_name.clone().unwrap_or_default());
        }
        match &seated.summary {
            Some(summary) => {
                row.push(summary.days_visited.to_string());
                row.push(format_hours(summary.total_hours));
            }
            None => {
                row.push("0".to_string());
                row.push(String::new());
            }
        }
        table.push_row(row);
    }
    table
}

pub fn visitors_table(visitors: &[EmployeeSummary]) -> Table {
    let mut table = Table::new(vec![
        COL_EMPLOYEE_ID.to_string(),
        COL_NAME.to_string(),
        COL_DAYS_VISITED.to_string(),
        COL_TOTAL_HOURS.to_string(),
    ]);
    for visitor in visitors {
        table.push_row(vec![
            visitor.employee_id.clone(),
            visitor.display_name.clone(),
            visitor.days_visited.to_string(),
            format_decimal_hours(visitor.total_hours),
        ]);
    }
    table
}

pub fn detail_table(days: &[DayAttendance]) -> Table {
    let mut table = Table::new(
        [
            COL_EMPLOYEE_ID,
            COL_NAME,
            COL_DATE,
            COL_FIRST_IN,
            COL_LAST_OUT,
            COL_TOTAL_TIME,
            COL_MISSING_PUNCH,
        ]
        .iter()
        .map(|h| h.to_string())
        .collect(),
    );
    for day in days {
        table.push_row(vec![
            day.employee_id.clone(),
            day.display_name.clone(),
            day.date.format("%Y-%m-%d").to_string(),
            day.first_in.map(format_clock).unwrap_or_default(),
            day.last_out.map(format_clock).unwrap_or_default(),
            day.total_time.map(format_duration_hms).unwrap_or_default(),
            day.missing_punch
                .map(|m| m.label().to_string())
                .unwrap_or_default(),
        ]);
    }
    table
}

// --- Run Report ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub negative_span_policy: NegativeSpanPolicy,
    pub stats: IngestStats,
    pub bindings: Vec<ColumnBinding>,
    pub ambiguities: Vec<SchemaAmbiguity>,
    pub seated_rows: usize,
    pub visitor_rows: usize,
    pub detail_rows: usize,
}

impl RunReport {
    pub fn log(&self) {
        for binding in &self.bindings {
            info!(
                "{} {} <- '{}' (column {})",
                binding.table, binding.role, binding.header, binding.index
            );
        }
        for ambiguity in &self.ambiguities {
            warn!(
                "{} {} matched several headers; used '{}', shadowed {:?}",
                ambiguity.table, ambiguity.role, ambiguity.chosen, ambiguity.shadowed
            );
        }
        info!(
            "Punch rows: {} read, {} without id, {} ignored events, {} unparseable timestamps",
            self.stats.punch_rows_read,
            self.stats.punch_rows_without_id,
            self.stats.ignored_events,
            self.stats.unparseable_timestamps
        );
        if self.stats.duplicate_seat_ids > 0 {
            warn!(
                "{} duplicate roster rows skipped; the first row per employee id is used",
                self.stats.duplicate_seat_ids
            );
        }
        if self.stats.negative_spans > 0 {
            warn!(
                "{} employee-days have last out before first in (policy: {:?})",
                self.stats.negative_spans, self.negative_span_policy
            );
        }
        info!(
            "Output: {} seated rows, {} visitors, {} detail rows",
            self.seated_rows, self.visitor_rows, self.detail_rows
        );
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn parse_hhmm(text: &str) -> Decimal {
        let (h, m) = text.split_once(':').expect("HH:MM");
        Decimal::from_str(h).unwrap() + Decimal::from_str(m).unwrap() / dec!(60)
    }

    #[test]
    fn formats_whole_and_fractional_hours() {
        assert_eq!(format_hours(dec!(9)), "09:00");
        assert_eq!(format_hours(dec!(7.5)), "07:30");
        assert_eq!(format_hours(dec!(0)), "00:00");
        assert_eq!(format_hours(dec!(123.25)), "123:15");
    }

    #[test]
    fn minute_rounding_is_half_even_and_carries() {
        // 0.075h is exactly 4.5 minutes, 0.025h exactly 1.5 minutes
        assert_eq!(format_hours(dec!(1.075)), "01:04");
        assert_eq!(format_hours(dec!(1.025)), "01:02");
        // 59.7 minutes rounds to 60 and carries
        assert_eq!(format_hours(dec!(1.995)), "02:00");
    }

    #[test]
    fn negative_hours_keep_sign() {
        assert_eq!(format_hours(dec!(-1.5)), "-01:30");
        assert_eq!(format_hours(dec!(-0.001)), "00:00");
    }

    #[test]
    fn hhmm_round_trip_within_a_minute() {
        let one_minute = dec!(1) / dec!(60);
        for hours in [dec!(0.01), dec!(1.333333), dec!(8.9999), dec!(17.12345), dec!(40.5)] {
            let back = parse_hhmm(&format_hours(hours));
            assert!(
                (back - hours).abs() <= one_minute,
                "{} formatted as {} came back as {}",
                hours,
                format_hours(hours),
                back
            );
        }
    }

    #[test]
    fn formats_durations_and_clock_times() {
        assert_eq!(format_duration_hms(Duration::seconds(9 * 3600)), "9:00:00");
        assert_eq!(format_duration_hms(Duration::seconds(3725)), "1:02:05");
        assert_eq!(format_duration_hms(Duration::milliseconds(59_999)), "0:00:59");
        assert_eq!(format_duration_hms(Duration::minutes(-90)), "-1:30:00");

        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(18, 5, 9)
            .unwrap();
        assert_eq!(format_clock(ts), "06:05:09 PM");
    }

    #[test]
    fn decimal_hours_for_visitors() {
        assert_eq!(format_decimal_hours(dec!(9.000)), "9");
        assert_eq!(format_decimal_hours(dec!(7.5)), "7.5");

        // 20 minutes stays a repeating fraction
        let twenty_minutes = crate::attendance::duration_to_hours(Duration::minutes(20));
        let rendered = format_decimal_hours(twenty_minutes);
        assert!(rendered.starts_with("0.33333333"), "got {}", rendered);
        assert_eq!(rendered, (dec!(1) / dec!(3)).normalize().to_string());
    }
}
