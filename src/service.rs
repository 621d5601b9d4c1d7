// src/service.rs
use tracing::info;

use crate::attendance::{
    build_day_attendance, classify, extract_punch_records, extract_seat_records, roll_up,
    Classification, DayAttendance, IngestStats,
};
use crate::config::{Config, NegativeSpanPolicy};
use crate::error::AttendanceError;
use crate::report::{detail_table, seated_summary_table, visitors_table, RunReport};
use crate::schema::{ambiguities, PunchSchema, SeatingSchema};
use crate::table::Table;
use crate::timestamp::TimestampParser;

/// Everything one run produces. The tables are ready for CSV rendering.
#[derive(Debug, Clone)]
pub struct AttendanceOutcome {
    pub seated_summary: Table,
    pub visitors: Table,
    pub detail: Table,
    pub days: Vec<DayAttendance>,
    pub classification: Classification,
    pub report: RunReport,
}

/// Stateless: each call to [`AttendanceService::analyze`] is an independent run.
pub struct AttendanceService {
    policy: NegativeSpanPolicy,
    parser: TimestampParser,
}

impl AttendanceService {
    pub fn new(policy: NegativeSpanPolicy, parser: TimestampParser) -> Self {
        Self { policy, parser }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.negative_span,
            TimestampParser::new(config.timestamp_formats.clone()),
        )
    }

    /// Resolves both schemas before touching any row, so a bad header aborts
    /// the run with no partial output.
    pub fn analyze(
        &self,
        seating: &Table,
        punch: &Table,
    ) -> Result<AttendanceOutcome, AttendanceError> {
        let seating_schema = SeatingSchema::resolve(&seating.headers)?;
        let punch_schema = PunchSchema::resolve(&punch.headers)?;
        info!(
            "Schemas resolved: {} seating rows, {} punch rows",
            seating.len(),
            punch.len()
        );

        let mut stats = IngestStats::default();
        let seats = extract_seat_records(seating, &seating_schema, &mut stats);
        let punches = extract_punch_records(punch, &punch_schema, &self.parser, &mut stats);

        let days = build_day_attendance(&punches, self.policy, &mut stats);
        let summaries = roll_up(&days);
        let classification = classify(&seats, &summaries);

        let seated_summary = seated_summary_table(&seating_schema, &classification);
        let visitors = visitors_table(&classification.visitors);
        let detail = detail_table(&days);

        let bindings = seating_schema
            .bindings()
            .into_iter()
            .chain(punch_schema.bindings())
            .cloned()
            .collect::<Vec<_>>();
        let report = RunReport {
            negative_span_policy: self.policy,
            stats,
            ambiguities: ambiguities(&bindings),
            bindings,
            seated_rows: seated_summary.len(),
            visitor_rows: visitors.len(),
            detail_rows: detail.len(),
        };
        report.log();

        Ok(AttendanceOutcome {
            seated_summary,
            visitors,
            detail,
            days,
            classification,
            report,
        })
    }
}
