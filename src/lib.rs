// src/lib.rs
//! Attendance summaries from a seating roster and a badge punch log.
//!
//! A run resolves the column layout of both CSV exports ([`schema`]), buckets
//! in/out punches per employee and day ([`attendance`]) and renders three
//! tables: the seated summary, visitors without a seat, and the per-day detail
//! sheet ([`report`]). [`service::AttendanceService`] ties the steps together.

pub mod attendance;
pub mod config;
pub mod error;
pub mod report;
pub mod schema;
pub mod service;
pub mod table;
pub mod timestamp;


pub use error::AttendanceError;
pub use service::{AttendanceOutcome, AttendanceService};
