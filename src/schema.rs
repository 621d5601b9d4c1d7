// src/schema.rs
use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::error::AttendanceError;

// --- Roles & Tables ---

/// Canonical field a raw CSV header can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnRole {
    EmployeeId,
    FirstName,
    LastName,
    EventKind,
    EventTimestamp,
    SeatEmployeeId,
    SeatDisplayName,
    SerialNumber,
}

impl ColumnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::EmployeeId => "EMPLOYEE_ID",
            ColumnRole::FirstName => "FIRST_NAME",
            ColumnRole::LastName => "LAST_NAME",
            ColumnRole::EventKind => "EVENT_KIND",
            ColumnRole::EventTimestamp => "EVENT_TIMESTAMP",
            ColumnRole::SeatEmployeeId => "SEAT_EMPLOYEE_ID",
            ColumnRole::SeatDisplayName => "SEAT_DISPLAY_NAME",
            ColumnRole::SerialNumber => "SERIAL_NUMBER",
        }
    }

    // Predicates run against normalized (trimmed, upper-cased) headers.
    fn matches(&self, header: &str) -> bool {
        match self {
            ColumnRole::EmployeeId => header == "EMPLOYEE ID" || header == "CARDHOLDER",
            ColumnRole::FirstName => header.contains("FIRST NAME"),
            ColumnRole::LastName => header.contains("LAST NAME"),
            ColumnRole::EventKind => header == "EVENT" || header.contains("EVENT"),
            ColumnRole::EventTimestamp => header.contains("EVENT TIMESTAMP"),
            ColumnRole::SeatEmployeeId => {
                header.contains("EMPLOYEE ID") && header.contains("SECURITY")
            }
            ColumnRole::SeatDisplayName => {
                header.contains("EMPLOYEE NAME") && header.contains("SECURITY")
            }
            ColumnRole::SerialNumber => header.contains("SR"),
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Punch,
    Seating,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Punch => f.write_str("punch log"),
            TableKind::Seating => f.write_str("seating roster"),
        }
    }
}

// --- Bindings ---

/// Which header satisfied a role, plus every later header that also qualified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnBinding {
    pub table: TableKind,
    pub role: ColumnRole,
    pub header: String,
    pub index: usize,
    pub shadowed: Vec<String>,
}

impl ColumnBinding {
    pub fn is_ambiguous(&self) -> bool {
        !self.shadowed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaAmbiguity {
    pub table: TableKind,
    pub role: ColumnRole,
    pub chosen: String,
    pub shadowed: Vec<String>,
}

impl From<&ColumnBinding> for SchemaAmbiguity {
    fn from(binding: &ColumnBinding) -> Self {
        SchemaAmbiguity {
            table: binding.table,
            role: binding.role,
            chosen: binding.header.clone(),
            shadowed: binding.shadowed.clone(),
        }
    }
}

pub fn normalize_header(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
        .to_uppercase()
}

pub fn normalize_headers(raw: &[String]) -> Vec<String> {
    raw.iter().map(|h| normalize_header(h)).collect()
}

/// First header (in column order) satisfying the role wins.
fn bind(headers: &[String], table: TableKind, role: ColumnRole) -> Option<ColumnBinding> {
    let mut candidates = headers
        .iter()
        .enumerate()
        .filter(|(_, header)| role.matches(header));
    let (index, header) = candidates.next()?;
    let shadowed: Vec<String> = candidates.map(|(_, h)| h.clone()).collect();

    let binding = ColumnBinding {
        table,
        role,
        header: header.clone(),
        index,
        shadowed,
    };
    debug!(
        "Bound {} in {} to column '{}' ({} shadowed)",
        role,
        table,
        binding.header,
        binding.shadowed.len()
    );
    Some(binding)
}

fn require(
    headers: &[String],
    table: TableKind,
    role: ColumnRole,
) -> Result<ColumnBinding, AttendanceError> {
    bind(headers, table, role).ok_or_else(|| AttendanceError::schema(role, table, headers))
}

// --- Punch Log Schema ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DisplayNameSource {
    /// "<first> <last>", each side trimmed.
    Composed {
        first: ColumnBinding,
        last: ColumnBinding,
    },
    /// No first/last name pair; the cleaned employee id doubles as the name.
    EmployeeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PunchSchema {
    pub employee_id: ColumnBinding,
    pub display_name: DisplayNameSource,
    pub event_kind: ColumnBinding,
    pub event_timestamp: ColumnBinding,
}

impl PunchSchema {
    pub fn resolve(raw_headers: &[String]) -> Result<Self, AttendanceError> {
        let headers = normalize_headers(raw_headers);
        let table = TableKind::Punch;

        let employee_id = require(&headers, table, ColumnRole::EmployeeId)?;
        let first = bind(&headers, table, ColumnRole::FirstName);
        let last = bind(&headers, table, ColumnRole::LastName);
        let event_kind = require(&headers, table, ColumnRole::EventKind)?;
        let event_timestamp = require(&headers, table, ColumnRole::EventTimestamp)?;

        let display_name = match (first, last) {
            (Some(first), Some(last)) => DisplayNameSource::Composed { first, last },
            _ => DisplayNameSource::EmployeeId,
        };

        Ok(Self {
            employee_id,
            display_name,
            event_kind,
            event_timestamp,
        })
    }

    pub fn bindings(&self) -> Vec<&ColumnBinding> {
        let mut bindings = vec![&self.employee_id];
        if let DisplayNameSource::Composed { first, last } = &self.display_name {
            bindings.push(first);
            bindings.push(last);
        }
        bindings.push(&self.event_kind);
        bindings.push(&self.event_timestamp);
        bindings
    }
}

// --- Seating Roster Schema ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatingSchema {
    pub employee_id: ColumnBinding,
    pub display_name: Option<ColumnBinding>,
    pub serial_number: Option<ColumnBinding>,
}

impl SeatingSchema {
    pub fn resolve(raw_headers: &[String]) -> Result<Self, AttendanceError> {
        let headers = normalize_headers(raw_headers);
        let table = TableKind::Seating;

        Ok(Self {
            employee_id: require(&headers, table, ColumnRole::SeatEmployeeId)?,
            display_name: bind(&headers, table, ColumnRole::SeatDisplayName),
            serial_number: bind(&headers, table, ColumnRole::SerialNumber),
        })
    }

    pub fn bindings(&self) -> Vec<&ColumnBinding> {
        let mut bindings = Vec::with_capacity(3);
        if let Some(serial) = &self.serial_number {
            bindings.push(serial);
        }
        bindings.push(&self.employee_id);
        if let Some(name) = &self.display_name {
            bindings.push(name);
        }
        bindings
    }
}

pub fn ambiguities<'a>(bindings: impl IntoIterator<Item = &'a ColumnBinding>) -> Vec<SchemaAmbiguity> {
    bindings
        .into_iter()
        .filter(|b| b.is_ambiguous())
        .map(SchemaAmbiguity::from)
        .collect()
}
