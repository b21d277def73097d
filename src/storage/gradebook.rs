//! A roster bound to its data file
//!
//! The [`Gradebook`] is the context object the front-ends pass around. It
//! owns the in-memory [`Store`] and knows where to load it from and save it
//! to.

use std::path::Path;

use crate::{
    domain::{Config, Record, Report, Store, StoreError, StudentId, StudentName},
    storage::datafile::{DataFile, LoadError, Loaded, SaveError, SkippedLine},
};

/// What a [`Gradebook::load`] found.
#[derive(Debug)]
pub struct LoadSummary {
    /// Whether the data file existed.
    pub found: bool,
    /// The number of students loaded.
    pub students: usize,
    /// Lines dropped under a lenient load policy.
    pub skipped: Vec<SkippedLine>,
}

/// An in-memory roster together with the file that persists it.
#[derive(Debug)]
pub struct Gradebook {
    store: Store,
    file: DataFile,
    pass_mark: f64,
}

impl Gradebook {
    /// Opens the gradebook described by `config`, loading any existing data.
    ///
    /// Lines skipped under a lenient load policy are logged and otherwise
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the data file exists but cannot be loaded.
    pub fn open(config: &Config) -> Result<Self, LoadError> {
        let mut gradebook = Self::empty(config);
        gradebook.load()?;
        Ok(gradebook)
    }

    /// Creates an empty gradebook without touching the filesystem.
    #[must_use]
    pub fn empty(config: &Config) -> Self {
        Self {
            store: Store::new(),
            file: DataFile::new(config.data_file().to_path_buf(), config.on_malformed),
            pass_mark: config.pass_mark(),
        }
    }

    /// The path of the data file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// The current roster.
    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// Reports over the current roster, using the configured pass mark.
    #[must_use]
    pub const fn report(&self) -> Report<'_> {
        Report::with_pass_mark(&self.store, self.pass_mark)
    }

    /// Adds a student. See [`Store::add`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if the id is in use, or
    /// [`StoreError::InvalidScore`] if a score is outside 0-100.
    pub fn add(
        &mut self,
        name: StudentName,
        id: StudentId,
        scores: Vec<f64>,
    ) -> Result<&Record, StoreError> {
        self.store.add(name, id, scores)
    }

    /// Removes a student. See [`Store::delete`].
    pub fn delete(&mut self, id: &StudentId) -> bool {
        self.store.delete(id)
    }

    /// Replaces a student's scores. See [`Store::modify`].
    ///
    /// # Errors
    ///
    /// Returns an error if the student does not exist or the number of scores
    /// differs.
    pub fn modify(&mut self, id: &StudentId, scores: Vec<f64>) -> Result<&Record, StoreError> {
        self.store.modify(id, scores)
    }

    /// Replaces the in-memory roster with the contents of the data file.
    ///
    /// On error the current roster is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the data file exists but cannot be loaded.
    pub fn load(&mut self) -> Result<LoadSummary, LoadError> {
        let Loaded {
            store,
            found,
            skipped,
        } = self.file.load()?;
        self.store = store;
        Ok(LoadSummary {
            found,
            students: self.store.len(),
            skipped,
        })
    }

    /// Writes the roster to the data file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written. The in-memory roster is
    /// unaffected either way.
    pub fn save(&self) -> Result<(), SaveError> {
        self.file.save(&self.store)
    }
}
