// src/attendance.rs
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

use crate::config::NegativeSpanPolicy;
use crate::schema::{DisplayNameSource, PunchSchema, SeatingSchema};
use crate::table::{cell, Table};
use crate::timestamp::TimestampParser;

type EmployeeId = String;

// --- Record Types ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    In,
    Out,
}

impl EventKind {
    /// Case-folded exact match; anything else (including padded text) is not a punch.
    pub fn classify(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "in" => Some(EventKind::In),
            "out" => Some(EventKind::Out),
            _ => None,
        }
    }
}

/// One punch log row after schema resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PunchRecord {
    pub employee_id: EmployeeId,
    pub display_name: String,
    pub event_kind: String,
    pub timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeatRecord {
    pub employee_id: EmployeeId,
    pub display_name: Option<String>,
    pub serial_number: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MissingPunch {
    PunchInMissing,
    PunchOutMissing,
    BothMissing,
}

impl MissingPunch {
    pub fn classify(
        first_in: Option<NaiveDateTime>,
        last_out: Option<NaiveDateTime>,
    ) -> Option<Self> {
        match (first_in, last_out) {
            (None, None) => Some(MissingPunch::BothMissing),
            (None, Some(_)) => Some(MissingPunch::PunchInMissing),
            (Some(_), None) => Some(MissingPunch::PunchOutMissing),
            (Some(_), Some(_)) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MissingPunch::PunchInMissing => "Punch In Missing",
            MissingPunch::PunchOutMissing => "Punch Out Missing",
            MissingPunch::BothMissing => "Both Missing",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayAttendance {
    pub employee_id: EmployeeId,
    pub display_name: String,
    pub date: NaiveDate,
    pub first_in: Option<NaiveDateTime>,
    pub last_out: Option<NaiveDateTime>,
    pub total_time: Option<Duration>,
    pub missing_punch: Option<MissingPunch>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeSummary {
    pub employee_id: EmployeeId,
    pub display_name: String,
    pub days_visited: usize,
    pub total_hours: Decimal,
}

/// Roster row joined with the punch roll-up (absent when the employee never punched).
#[derive(Debug, Clone, PartialEq)]
pub struct SeatedEmployee {
    pub seat: SeatRecord,
    pub summary: Option<EmployeeSummary>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub seated: Vec<SeatedEmployee>,
    pub visitors: Vec<EmployeeSummary>,
}

/// Row-level defects absorbed during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub punch_rows_read: usize,
    pub punch_rows_without_id: usize,
    pub unparseable_timestamps: usize,
    pub ignored_events: usize,
    pub undated_punches: usize,
    pub seating_rows_read: usize,
    pub seating_rows_without_id: usize,
    pub duplicate_seat_ids: usize,
    pub negative_spans: usize,
    pub dropped_days: usize,
}

// --- Extraction ---

pub fn extract_punch_records(
    table: &Table,
    schema: &PunchSchema,
    parser: &TimestampParser,
    stats: &mut IngestStats,
) -> Vec<PunchRecord> {
    let mut records = Vec::with_capacity(table.len());

    for row in &table.rows {
        stats.punch_rows_read += 1;

        let employee_id = cell(row, schema.employee_id.index).trim();
        if employee_id.is_empty() {
            stats.punch_rows_without_id += 1;
            continue;
        }

        let display_name = match &schema.display_name {
            DisplayNameSource::Composed { first, last } => format!(
                "{} {}",
                cell(row, first.index).trim(),
                cell(row, last.index).trim()
            ),
            DisplayNameSource::EmployeeId => employee_id.to_string(),
        };

        let raw_timestamp = cell(row, schema.event_timestamp.index);
        let timestamp = parser.parse(raw_timestamp);
        if timestamp.is_none() {
            stats.unparseable_timestamps += 1;
            debug!(
                "Unparseable timestamp '{}' for employee {}",
                raw_timestamp, employee_id
            );
        }

        records.push(PunchRecord {
            employee_id: employee_id.to_string(),
            display_name,
            event_kind: cell(row, schema.event_kind.index).to_string(),
            timestamp,
        });
    }

    records
}

/// Roster rows with a blank id are skipped. A repeated id keeps its first row.
pub fn extract_seat_records(
    table: &Table,
    schema: &SeatingSchema,
    stats: &mut IngestStats,
) -> Vec<SeatRecord> {
    let mut seats = Vec::with_capacity(table.len());
    let mut seen: HashSet<&str> = HashSet::new();

    for row in &table.rows {
        stats.seating_rows_read += 1;

        let employee_id = cell(row, schema.employee_id.index).trim();
        if employee_id.is_empty() {
            stats.seating_rows_without_id += 1;
            continue;
        }
        if !seen.insert(employee_id) {
            stats.duplicate_seat_ids += 1;
            debug!("Duplicate roster entry for {} skipped", employee_id);
            continue;
        }

        seats.push(SeatRecord {
            employee_id: employee_id.to_string(),
            display_name: schema
                .display_name
                .as_ref()
                .map(|b| cell(row, b.index).to_string()),
            serial_number: schema
                .serial_number
                .as_ref()
                .map(|b| cell(row, b.index).to_string()),
        });
    }

    seats
}

// --- Aggregation ---

#[derive(Debug, Default)]
struct DayAccumulator {
    first_in: Option<NaiveDateTime>,
    last_out: Option<NaiveDateTime>,
}

impl DayAccumulator {
    fn record(&mut self, kind: EventKind, ts: NaiveDateTime) {
        match kind {
            EventKind::In => {
                self.first_in = Some(self.first_in.map_or(ts, |current| current.min(ts)));
            }
            EventKind::Out => {
                self.last_out = Some(self.last_out.map_or(ts, |current| current.max(ts)));
            }
        }
    }
}

/// Buckets in/out punches by (employee, calendar date) and reduces each bucket
/// to first-in, last-out, worked time and a missing-punch flag.
///
/// Output is ordered by employee id, then date. The display name of a day is the
/// first name seen on a dated in/out punch for that employee.
pub fn build_day_attendance(
    records: &[PunchRecord],
    policy: NegativeSpanPolicy,
    stats: &mut IngestStats,
) -> Vec<DayAttendance> {
    let mut names: HashMap<&str, &str> = HashMap::new();
    let mut buckets: BTreeMap<(&str, NaiveDate), DayAccumulator> = BTreeMap::new();

    for record in records {
        let Some(kind) = EventKind::classify(&record.event_kind) else {
            stats.ignored_events += 1;
            continue;
        };

        // No timestamp means no calendar date, so the punch cannot open a bucket.
        let Some(ts) = record.timestamp else {
            stats.undated_punches += 1;
            continue;
        };
        names
            .entry(record.employee_id.as_str())
            .or_insert(record.display_name.as_str());

        buckets
            .entry((record.employee_id.as_str(), ts.date()))
            .or_default()
            .record(kind, ts);
    }

    let mut days = Vec::with_capacity(buckets.len());
    for ((employee_id, date), acc) in buckets {
        let mut total_time = match (acc.first_in, acc.last_out) {
            (Some(first_in), Some(last_out)) => Some(last_out - first_in),
            _ => None,
        };

        if total_time.is_some_and(|t| t < Duration::zero()) {
            stats.negative_spans += 1;
            match policy {
                NegativeSpanPolicy::Keep => {}
                NegativeSpanPolicy::Clamp => total_time = Some(Duration::zero()),
                NegativeSpanPolicy::Drop => {
                    debug!(
                        "Dropping {} on {}: last out precedes first in",
                        employee_id, date
                    );
                    stats.dropped_days += 1;
                    continue;
                }
            }
        }

        days.push(DayAttendance {
            employee_id: employee_id.to_string(),
            display_name: names.get(employee_id).copied().unwrap_or(employee_id).to_string(),
            date,
            first_in: acc.first_in,
            last_out: acc.last_out,
            total_time,
            missing_punch: MissingPunch::classify(acc.first_in, acc.last_out),
        });
    }

    info!(
        "Built {} employee-day rows from {} punch records",
        days.len(),
        records.len()
    );
    days
}

pub fn duration_to_hours(duration: Duration) -> Decimal {
    Decimal::new(duration.num_milliseconds(), 3) / dec!(3600)
}

/// Per-employee roll-up, ordered by employee id. Days without a worked time
/// still count as visited but add nothing to the hours.
pub fn roll_up(days: &[DayAttendance]) -> Vec<EmployeeSummary> {
    let mut summaries: BTreeMap<&str, EmployeeSummary> = BTreeMap::new();
    let mut seen_dates: HashSet<(&str, NaiveDate)> = HashSet::new();

    for day in days {
        let summary = summaries
            .entry(day.employee_id.as_str())
            .or_insert_with(|| EmployeeSummary {
                employee_id: day.employee_id.clone(),
                display_name: day.display_name.clone(),
                days_visited: 0,
                total_hours: Decimal::ZERO,
            });

        if seen_dates.insert((day.employee_id.as_str(), day.date)) {
            summary.days_visited += 1;
        }
        if let Some(total_time) = day.total_time {
            summary.total_hours += duration_to_hours(total_time);
        }
    }

    summaries.into_values().collect()
}

/// Splits the roll-up into roster rows (in roster order) and visitors without a seat.
/// Identifiers compare exactly after trimming; no case folding.
pub fn classify(seats: &[SeatRecord], summaries: &[EmployeeSummary]) -> Classification {
    let by_id: HashMap<&str, &EmployeeSummary> = summaries
        .iter()
        .map(|s| (s.employee_id.as_str(), s))
        .collect();
    let seated_ids: HashSet<&str> = seats.iter().map(|s| s.employee_id.as_str()).collect();

    let seated = seats
        .iter()
        .map(|seat| SeatedEmployee {
            seat: seat.clone(),
            summary: by_id.get(seat.employee_id.as_str()).map(|s| (*s).clone()),
        })
        .collect::<Vec<_>>();

    let visitors = summaries
        .iter()
        .filter(|s| !seated_ids.contains(s.employee_id.as_str()))
        .cloned()
        .collect::<Vec<_>>();

    info!(
        "Classified {} roster rows and {} visitors without seat allotment",
        seated.len(),
        visitors.len()
    );
    Classification { seated, visitors }
}
