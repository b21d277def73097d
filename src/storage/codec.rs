//! Line codecs for the roster data file.

use std::fmt::Write as _;

use crate::domain::{Record, StudentId, StudentName, ValidationError, validate::validate_score};

/// Converts single records to and from one line of text.
///
/// The data file is a sequence of encoded lines, so a codec never sees (or
/// produces) a line terminator.
pub trait Codec {
    /// Encodes a record as a single line, without a trailing newline.
    fn encode(&self, record: &Record) -> String;

    /// Decodes a single line into a record.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the line is malformed.
    fn decode(&self, line: &str) -> Result<Record, DecodeError>;
}

/// Errors that can occur when decoding a line.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// The line has no id field.
    #[error("expected at least a name and an ID, found {0} field(s)")]
    MissingFields(usize),

    /// The name field is invalid.
    #[error("invalid name: {0}")]
    Name(#[source] ValidationError),

    /// The id field is invalid.
    #[error("invalid ID: {0}")]
    Id(#[source] ValidationError),

    /// A score field is invalid.
    #[error("invalid score for subject {subject}: {source}")]
    Score {
        /// 1-based subject number.
        subject: usize,
        /// Why the score was rejected.
        #[source]
        source: ValidationError,
    },
}

/// The flat comma-delimited format: `name,id,score_1,...,score_n`.
///
/// No escaping is performed. Names and ids are validated to be free of
/// commas and line breaks, so every record round-trips.
///
/// Scores are written with the shortest representation that parses back to
/// the same `f64` (`90`, `87.5`, `0.1`).
#[derive(Debug, Clone, Copy, Default)]
pub struct CommaSeparated;

impl CommaSeparated {
    const DELIMITER: char = ',';
}

impl Codec for CommaSeparated {
    fn encode(&self, record: &Record) -> String {
        let mut line = format!(
            "{}{}{}",
            record.name(),
            Self::DELIMITER,
            record.id()
        );
        for score in record.scores() {
            // Writing to a String cannot fail.
            let _ = write!(line, "{}{score}", Self::DELIMITER);
        }
        line
    }

    fn decode(&self, line: &str) -> Result<Record, DecodeError> {
        let mut fields = line.split(Self::DELIMITER);

        let name = fields.next().unwrap_or_default();
        let Some(id) = fields.next() else {
            return Err(DecodeError::MissingFields(1));
        };

        let name = StudentName::new(name).map_err(DecodeError::Name)?;
        let id = StudentId::new(id.trim().to_string()).map_err(DecodeError::Id)?;

        let scores = fields
            .enumerate()
            .map(|(i, field)| {
                validate_score(field).map_err(|source| DecodeError::Score {
                    subject: i + 1,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Record::from_validated(name, id, scores))
    }
}
