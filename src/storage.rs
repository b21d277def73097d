pub mod codec;
pub mod datafile;
mod gradebook;

pub use codec::{Codec, CommaSeparated, DecodeError};
pub use datafile::{DataFile, LoadError, Loaded, SaveError, SkippedLine};
pub use gradebook::{Gradebook, LoadSummary};
