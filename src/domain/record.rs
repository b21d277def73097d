use std::{
    fmt,
    hash::{Hash, Hasher},
    ops::Deref,
    str::FromStr,
};

use non_empty_string::NonEmptyString;

use crate::domain::validate::{self, ValidationError};

/// The mark a score must reach for a subject to count as passed.
pub const PASS_MARK: f64 = 60.0;

/// A validated student identifier.
///
/// Identifiers are non-empty and contain neither whitespace nor commas, so
/// they survive both whitespace-delimited prompts and the comma-delimited
/// data file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct StudentId(NonEmptyString);

impl StudentId {
    /// Creates a new `StudentId`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the string is empty or contains
    /// whitespace or commas.
    pub fn new(s: String) -> Result<Self, ValidationError> {
        validate::check_id(&s)?;
        NonEmptyString::new(s)
            .map(Self)
            .map_err(|_| ValidationError::EmptyId)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Hash for StudentId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Deref for StudentId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StudentId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<&str> for StudentId {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

/// A validated student display name.
///
/// Names are trimmed, non-empty, and free of commas and line breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentName(NonEmptyString);

impl StudentName {
    /// Creates a new `StudentName`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the trimmed name is empty or contains
    /// a comma or line break.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = validate::check_name(s)?;
        NonEmptyString::new(trimmed.to_string())
            .map(Self)
            .map_err(|_| ValidationError::EmptyName)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for StudentName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StudentName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// One student's identity and subject scores.
///
/// Scores are stored in subject order. The total and pass/fail status are
/// derived on demand and never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    name: StudentName,
    id: StudentId,
    scores: Vec<f64>,
}

impl Record {
    /// Creates a record, checking every score lies in 0-100.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] for the first score outside
    /// the range, so that every record can be saved and loaded again.
    pub fn new(
        name: StudentName,
        id: StudentId,
        scores: Vec<f64>,
    ) -> Result<Self, ValidationError> {
        check_scores(&scores)?;
        Ok(Self::from_validated(name, id, scores))
    }

    /// Creates a record from scores the caller has already range-checked.
    pub(crate) const fn from_validated(name: StudentName, id: StudentId, scores: Vec<f64>) -> Self {
        Self { name, id, scores }
    }

    /// The student's identifier.
    #[must_use]
    pub const fn id(&self) -> &StudentId {
        &self.id
    }

    /// The student's display name.
    #[must_use]
    pub const fn name(&self) -> &StudentName {
        &self.name
    }

    /// The scores in subject order.
    #[must_use]
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// The number of subjects this record was created with.
    #[must_use]
    pub fn subject_count(&self) -> usize {
        self.scores.len()
    }

    /// Sum of all scores. A record with no subjects totals zero.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.scores.iter().sum()
    }

    /// Whether any score falls below [`PASS_MARK`].
    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.has_failed_below(PASS_MARK)
    }

    /// Whether any score falls strictly below `pass_mark`.
    ///
    /// Vacuously false for a record with no subjects.
    #[must_use]
    pub fn has_failed_below(&self, pass_mark: f64) -> bool {
        self.scores.iter().any(|&score| score < pass_mark)
    }

    /// Whether every score reaches [`PASS_MARK`].
    #[must_use]
    pub fn passed(&self) -> bool {
        !self.has_failed()
    }

    pub(crate) fn replace_scores(&mut self, scores: Vec<f64>) {
        self.scores = scores;
    }
}

/// Range-checks every score in a list.
pub(crate) fn check_scores(scores: &[f64]) -> Result<(), ValidationError> {
    scores
        .iter()
        .try_for_each(|&score| validate::check_score(score).map(drop))
}

#[cfg(test)]
pub(crate) fn record(name: &str, id: &str, scores: &[f64]) -> Record {
    Record::new(
        StudentName::new(name).unwrap(),
        StudentId::new(id.to_string()).unwrap(),
        scores.to_vec(),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(&[90.0, 55.0], 145.0; "two subjects")]
    #[test_case(&[70.0, 80.0], 150.0; "all passing")]
    #[test_case(&[], 0.0; "no subjects")]
    #[test_case(&[12.5, 0.25, 100.0], 112.75; "fractional")]
    fn total_is_sum_of_scores(scores: &[f64], expected: f64) {
        let record = record("Alice", "S1", scores);
        assert!((record.total() - expected).abs() < f64::EPSILON);
    }

    #[test_case(&[90.0, 55.0], true; "one failing subject")]
    #[test_case(&[60.0, 100.0], false; "exactly the pass mark passes")]
    #[test_case(&[59.999, 100.0], true; "just under the pass mark")]
    #[test_case(&[], false; "no subjects never fails")]
    fn has_failed_checks_every_score(scores: &[f64], expected: bool) {
        let record = record("Alice", "S1", scores);
        assert_eq!(record.has_failed(), expected);
        assert_eq!(record.passed(), !expected);
    }

    #[test]
    fn custom_pass_mark() {
        let record = record("Alice", "S1", &[65.0, 70.0]);
        assert!(!record.has_failed());
        assert!(record.has_failed_below(70.0 + f64::EPSILON));
        assert!(!record.has_failed_below(65.0));
    }

    #[test_case(&[100.5]; "above maximum")]
    #[test_case(&[90.0, -1.0]; "negative")]
    #[test_case(&[f64::NAN]; "not a number")]
    fn new_rejects_out_of_range_scores(scores: &[f64]) {
        let result = Record::new(
            StudentName::new("Alice").unwrap(),
            StudentId::new("S1".to_string()).unwrap(),
            scores.to_vec(),
        );

        assert!(matches!(result, Err(ValidationError::OutOfRange(_))));
    }

    #[test]
    fn id_rejects_whitespace_and_commas() {
        assert!(StudentId::new("S 1".to_string()).is_err());
        assert!(StudentId::new("S,1".to_string()).is_err());
        assert!(StudentId::new(String::new()).is_err());
        assert_eq!(StudentId::new("S1".to_string()).unwrap().as_str(), "S1");
    }

    #[test]
    fn name_is_trimmed() {
        let name = StudentName::new("  Ada Lovelace \n").unwrap();
        assert_eq!(name.as_str(), "Ada Lovelace");
        assert!(StudentName::new("   ").is_err());
        assert!(StudentName::new("Lovelace, Ada").is_err());
    }
}
