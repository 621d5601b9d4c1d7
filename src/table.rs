// src/table.rs
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::error::AttendanceError;

/// Header row plus string cells. Used for both the uploaded inputs and the rendered outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Reads comma-separated UTF-8 with a header row. Short rows are padded
    /// on access (see [`cell`]), long rows keep their extra cells.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AttendanceError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        debug!("Read table with {} columns and {} rows", headers.len(), rows.len());
        Ok(Self { headers, rows })
    }

    pub fn from_path(path: &Path) -> Result<Self, AttendanceError> {
        info!("Reading CSV from {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), AttendanceError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(writer);
        csv_writer.write_record(&self.headers)?;
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, AttendanceError> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(buffer)
    }

    pub fn write_to_path(&self, path: &Path) -> Result<(), AttendanceError> {
        let file = File::create(path)?; // Overwrites existing file
        self.write_csv(file)?;
        info!("Wrote {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }
}

/// Cell lookup that treats a missing trailing cell as empty.
pub fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}
