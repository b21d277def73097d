//! In-memory roster of student records
//!
//! The [`Store`] keeps records in insertion order alongside an index of the
//! identifiers in use. It knows nothing about the filesystem.

use std::collections::HashSet;

use thiserror::Error;
use tracing::instrument;

use crate::domain::{
    record::{self, Record, StudentId, StudentName},
    validate::ValidationError,
};

/// An in-memory collection of records with unique identifiers.
///
/// Records are stored as:
/// - `records`: a `Vec` in insertion order, which is also the order used for
///   listing and saving
/// - `ids`: a `HashSet` of every identifier in `records`, for O(1) duplicate
///   checks
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Store {
    records: Vec<Record>,

    /// Always equal to the set of ids in `records`.
    ids: HashSet<StudentId>,
}

/// Errors that can occur when mutating the store.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    /// A record with this identifier already exists.
    #[error("student ID {0} already exists")]
    DuplicateId(StudentId),

    /// No record has this identifier.
    #[error("student {0} not found")]
    NotFound(StudentId),

    /// Replacement scores did not match the record's subject count.
    #[error("student {id} has {expected} subjects, but {actual} scores were given")]
    SubjectCountMismatch {
        /// The record being modified.
        id: StudentId,
        /// The record's subject count.
        expected: usize,
        /// The number of scores supplied.
        actual: usize,
    },

    /// A score was outside the valid range.
    #[error(transparent)]
    InvalidScore(#[from] ValidationError),
}

impl Store {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with room for `capacity` records.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            ids: HashSet::with_capacity(capacity),
        }
    }

    /// Builds a store from existing records, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] for the first identifier that
    /// appears more than once.
    pub fn from_records<I>(records: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = Record>,
    {
        let records = records.into_iter();
        let mut store = Self::with_capacity(records.size_hint().0);
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    /// Adds a new student.
    ///
    /// The identifier is checked against the index before anything is
    /// inserted, so a failed add leaves the store unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidScore`] if a score is outside 0-100, or
    /// [`StoreError::DuplicateId`] if `id` is already in use.
    #[instrument(skip(self, scores), fields(subjects = scores.len()))]
    pub fn add(
        &mut self,
        name: StudentName,
        id: StudentId,
        scores: Vec<f64>,
    ) -> Result<&Record, StoreError> {
        let index = self.records.len();
        self.insert(Record::new(name, id, scores)?)?;
        tracing::debug!(count = self.records.len(), "student added");
        Ok(&self.records[index])
    }

    /// Inserts a complete record, enforcing identifier uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if the record's id is in use.
    pub fn insert(&mut self, record: Record) -> Result<(), StoreError> {
        if self.ids.contains(record.id()) {
            return Err(StoreError::DuplicateId(record.id().clone()));
        }
        self.ids.insert(record.id().clone());
        self.records.push(record);
        Ok(())
    }

    /// Removes the student with the given identifier.
    ///
    /// Returns `true` if a record was removed, `false` if none matched.
    #[instrument(skip(self))]
    pub fn delete(&mut self, id: &StudentId) -> bool {
        if !self.ids.remove(id) {
            tracing::debug!("no student to delete");
            return false;
        }
        self.records.retain(|record| record.id() != id);
        true
    }

    /// Replaces a student's scores in place.
    ///
    /// The name, identifier and subject count are preserved.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no record has this identifier,
    /// [`StoreError::SubjectCountMismatch`] if `scores` has a different length
    /// from the existing scores, or [`StoreError::InvalidScore`] if a score is
    /// outside 0-100. The record is unchanged on error.
    #[instrument(skip(self, scores))]
    pub fn modify(&mut self, id: &StudentId, scores: Vec<f64>) -> Result<&Record, StoreError> {
        let record = self
            .records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        if record.subject_count() != scores.len() {
            return Err(StoreError::SubjectCountMismatch {
                id: id.clone(),
                expected: record.subject_count(),
                actual: scores.len(),
            });
        }

        record::check_scores(&scores)?;
        record.replace_scores(scores);
        Ok(record)
    }

    /// Looks up a student by identifier.
    #[must_use]
    pub fn get(&self, id: &StudentId) -> Option<&Record> {
        if !self.ids.contains(id) {
            return None;
        }
        self.records.iter().find(|record| record.id() == id)
    }

    /// Whether a student with this identifier exists.
    #[must_use]
    pub fn contains(&self, id: &StudentId) -> bool {
        self.ids.contains(id)
    }

    /// All records, in insertion order.
    #[must_use]
    pub fn all(&self) -> &[Record] {
        &self.records
    }

    /// The number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a Store {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
