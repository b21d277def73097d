//! Pure validation of raw user input.
//!
//! Every function here takes text exactly as typed and either returns the
//! validated value or a [`ValidationError`] describing why it was rejected.
//! Callers decide whether to re-prompt or bail out.

use std::ops::RangeInclusive;

/// The inclusive range every score must fall in.
pub const SCORE_RANGE: RangeInclusive<f64> = 0.0..=100.0;

/// The largest number of subjects a single record may carry.
pub const MAX_SUBJECTS: usize = 100;

/// Reasons raw input can be rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The input could not be parsed as a number.
    #[error("'{0}' is not a number")]
    NotANumber(String),

    /// The score lies outside [`SCORE_RANGE`].
    #[error("score {0} is out of range, expected a number between 0 and 100")]
    OutOfRange(f64),

    /// The identifier was empty.
    #[error("student ID cannot be empty")]
    EmptyId,

    /// The identifier contained whitespace or a comma.
    #[error("student ID '{0}' cannot contain whitespace or commas")]
    InvalidId(String),

    /// The name was empty after trimming.
    #[error("student name cannot be empty")]
    EmptyName,

    /// The name contained a comma or line break.
    #[error("student name '{0}' cannot contain commas or line breaks")]
    InvalidName(String),

    /// The subject count was not a whole number within bounds.
    #[error("'{0}' is not a valid number of subjects (0-{MAX_SUBJECTS})")]
    InvalidSubjectCount(String),

    /// A score list had the wrong number of entries.
    #[error("expected {expected} scores, got {actual}")]
    ScoreCount {
        /// The number of scores required.
        expected: usize,
        /// The number of scores supplied.
        actual: usize,
    },
}

/// Parses and range-checks a single score.
///
/// # Errors
///
/// Returns [`ValidationError::NotANumber`] for non-numeric input and
/// [`ValidationError::OutOfRange`] for values outside 0-100 (including NaN
/// and infinities).
pub fn validate_score(input: &str) -> Result<f64, ValidationError> {
    let trimmed = input.trim();
    let score = trimmed
        .parse::<f64>()
        .map_err(|_| ValidationError::NotANumber(trimmed.to_string()))?;
    check_score(score)
}

/// Range-checks an already parsed score.
///
/// # Errors
///
/// Returns [`ValidationError::OutOfRange`] if the score is outside 0-100.
pub fn check_score(score: f64) -> Result<f64, ValidationError> {
    if SCORE_RANGE.contains(&score) {
        Ok(score)
    } else {
        Err(ValidationError::OutOfRange(score))
    }
}

/// Parses a comma-separated list of scores, such as `90,55.5,70`.
///
/// An empty input yields an empty list. If `expected` is given, the list
/// must have exactly that many entries.
///
/// # Errors
///
/// Returns the first invalid score, or [`ValidationError::ScoreCount`] if the
/// length does not match `expected`.
pub fn validate_scores(input: &str, expected: Option<usize>) -> Result<Vec<f64>, ValidationError> {
    let scores = if input.trim().is_empty() {
        Vec::new()
    } else {
        input
            .split(',')
            .map(validate_score)
            .collect::<Result<Vec<_>, _>>()?
    };

    match expected {
        Some(expected) if expected != scores.len() => Err(ValidationError::ScoreCount {
            expected,
            actual: scores.len(),
        }),
        _ => Ok(scores),
    }
}

/// Parses the number of subjects for a new record.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidSubjectCount`] unless the input is a
/// whole number no greater than [`MAX_SUBJECTS`].
pub fn validate_subject_count(input: &str) -> Result<usize, ValidationError> {
    let trimmed = input.trim();
    trimmed
        .parse::<usize>()
        .ok()
        .filter(|count| *count <= MAX_SUBJECTS)
        .ok_or_else(|| ValidationError::InvalidSubjectCount(trimmed.to_string()))
}

/// Parses the size of a ranking request.
///
/// Zero and negative numbers both mean "show everyone" and map to `0`.
///
/// # Errors
///
/// Returns [`ValidationError::NotANumber`] if the input is not an integer.
pub fn validate_top_n(input: &str) -> Result<usize, ValidationError> {
    let trimmed = input.trim();
    let n = trimmed
        .parse::<i64>()
        .map_err(|_| ValidationError::NotANumber(trimmed.to_string()))?;
    Ok(usize::try_from(n).unwrap_or(0))
}

pub(crate) fn check_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::EmptyId);
    }
    if id.chars().any(|c| c.is_whitespace() || c == ',') {
        return Err(ValidationError::InvalidId(id.to_string()));
    }
    Ok(())
}

pub(crate) fn check_name(name: &str) -> Result<&str, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if trimmed.contains([',', '\n', '\r']) {
        return Err(ValidationError::InvalidName(trimmed.to_string()));
    }
    Ok(trimmed)
}
