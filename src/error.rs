// src/error.rs
use thiserror::Error;

use crate::schema::{ColumnRole, TableKind};

// --- Error Handling ---

#[derive(Error, Debug)]
pub enum AttendanceError {
    #[error("Could not find a {role} column in the {table} (headers: {headers})")]
    SchemaResolution {
        role: ColumnRole,
        table: TableKind,
        headers: String, // Normalized headers, comma separated, for the error message
    },
    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] envy::Error),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl AttendanceError {
    pub fn schema(role: ColumnRole, table: TableKind, headers: &[String]) -> Self {
        AttendanceError::SchemaResolution {
            role,
            table,
            headers: headers.join(", "),
        }
    }
}
