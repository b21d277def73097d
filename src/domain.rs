//! Domain models for the gradebook.
//!
//! This module contains the student record, the in-memory store that owns
//! the roster, the reports computed over it, input validation, and
//! configuration.

/// Student records and their validated identity types.
pub mod record;
pub use record::{PASS_MARK, Record, StudentId, StudentName};

/// The in-memory roster.
pub mod store;
pub use store::{Store, StoreError};

pub mod report;
pub use report::{Report, ReportError, Row};

mod config;
pub use config::{Config, ConfigError, LoadPolicy};

pub mod validate;
pub use validate::ValidationError;
