//! Read-only queries over a [`Store`].
//!
//! Reports are computed fresh on every call; nothing is cached.

use serde::Serialize;
use thiserror::Error;

use crate::domain::{
    record::{PASS_MARK, Record},
    store::Store,
};

/// Errors that can occur when computing a report.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// The report needs at least one record.
    #[error("no student data")]
    EmptyStore,
}

/// A borrowed view of a store that answers aggregate questions.
///
/// "Failed" means a score below the report's pass mark. With
/// [`Report::new`] that is [`PASS_MARK`], so [`failed_students`] and
/// [`Row::failed`] agree with [`Record::has_failed`]. A report built with
/// [`Report::with_pass_mark`] judges against its own mark instead, and may
/// disagree with `has_failed` for the same record.
///
/// [`failed_students`]: Report::failed_students
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    store: &'a Store,
    pass_mark: f64,
}

/// One line of the student listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row<'a> {
    /// 1-based position in the listing.
    pub position: usize,
    /// The student's name.
    pub name: &'a str,
    /// The student's identifier.
    pub id: &'a str,
    /// The scores in subject order.
    pub scores: &'a [f64],
    /// The sum of the scores.
    pub total: f64,
    /// Whether any score fell below the report's pass mark.
    pub failed: bool,
}

impl<'a> Report<'a> {
    /// Creates a report using the default [`PASS_MARK`].
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self::with_pass_mark(store, PASS_MARK)
    }

    /// Creates a report with a custom pass mark for
    /// [`failed_students`](Self::failed_students).
    #[must_use]
    pub const fn with_pass_mark(store: &'a Store, pass_mark: f64) -> Self {
        Self { store, pass_mark }
    }

    /// The mean total score across all students.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::EmptyStore`] if there are no students.
    #[allow(clippy::cast_precision_loss)]
    pub fn class_average(&self) -> Result<f64, ReportError> {
        let records = self.store.all();
        if records.is_empty() {
            return Err(ReportError::EmptyStore);
        }
        let sum: f64 = records.iter().map(Record::total).sum();
        Ok(sum / records.len() as f64)
    }

    /// Students ordered by total, highest first.
    ///
    /// Ties keep their insertion order. A `top_n` of zero returns everyone;
    /// otherwise at most `top_n` students are returned.
    #[must_use]
    pub fn ranking(&self, top_n: usize) -> Vec<&'a Record> {
        let mut ranked: Vec<&Record> = self.store.all().iter().collect();
        // `sort_by` is stable, so equal totals stay in insertion order.
        ranked.sort_by(|a, b| b.total().total_cmp(&a.total()));
        if top_n > 0 {
            ranked.truncate(top_n);
        }
        ranked
    }

    /// Students with at least one score below the report's pass mark, in
    /// insertion order.
    #[must_use]
    pub fn failed_students(&self) -> Vec<&'a Record> {
        self.store
            .all()
            .iter()
            .filter(|record| record.has_failed_below(self.pass_mark))
            .collect()
    }

    /// Every student as a listing row, in insertion order.
    #[must_use]
    pub fn listing(&self) -> Vec<Row<'a>> {
        self.rows(self.store.all().iter())
    }

    /// Builds numbered rows from any sequence of records.
    #[must_use]
    pub fn rows<I>(&self, records: I) -> Vec<Row<'a>>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records
            .into_iter()
            .enumerate()
            .map(|(i, record)| Row {
                position: i + 1,
                name: record.name().as_str(),
                id: record.id().as_str(),
                scores: record.scores(),
                total: record.total(),
                failed: record.has_failed_below(self.pass_mark),
            })
            .collect()
    }
}
