//! Plain-text Student Gradebook
//!
//! A roster of students and their subject scores, kept in memory and
//! persisted as a flat comma-separated file.

pub mod domain;
pub use domain::{
    Config, LoadPolicy, Record, Report, ReportError, Row, Store, StoreError, StudentId, StudentName,
    ValidationError,
};

/// Filesystem storage for the roster.
pub mod storage;
pub use storage::{DataFile, Gradebook};
