//! A filesystem backed snapshot of the roster
//!
//! The [`DataFile`] reads and writes a whole [`Store`] at once. It is a
//! wrapper around a line [`Codec`], which knows nothing about files.

use std::{
    ffi::OsString,
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::instrument;

use crate::{
    domain::{LoadPolicy, Record, Store, StudentId},
    storage::codec::{Codec, CommaSeparated, DecodeError},
};

/// The roster's data file.
#[derive(Debug, Clone)]
pub struct DataFile<C = CommaSeparated> {
    path: PathBuf,
    policy: LoadPolicy,
    codec: C,
}

/// The result of a successful load.
#[derive(Debug, Default)]
pub struct Loaded {
    /// The loaded roster.
    pub store: Store,
    /// Whether the data file existed. A missing file loads as an empty
    /// roster.
    pub found: bool,
    /// Lines dropped under [`LoadPolicy::Skip`].
    pub skipped: Vec<SkippedLine>,
}

/// A line that was dropped while loading.
#[derive(Debug)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    /// Why the line was dropped.
    pub reason: LoadError,
}

/// Errors that can occur when loading the data file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file exists but could not be read.
    #[error("failed to read data file {path}")]
    Io {
        /// The data file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// A line could not be decoded.
    #[error("line {line}: {source}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Why the line was rejected.
        #[source]
        source: DecodeError,
    },

    /// A line repeats an id from an earlier line.
    #[error("line {line}: duplicate student ID {id}")]
    DuplicateId {
        /// 1-based line number.
        line: usize,
        /// The repeated id.
        id: StudentId,
    },
}

/// Errors that can occur when saving the data file.
#[derive(Debug, thiserror::Error)]
#[error("failed to write data file {path}")]
pub struct SaveError {
    /// The data file.
    pub path: PathBuf,
    /// The underlying error.
    #[source]
    pub source: io::Error,
}

impl DataFile {
    /// Opens a data file at the given path using the comma-separated format.
    #[must_use]
    pub const fn new(path: PathBuf, policy: LoadPolicy) -> Self {
        Self::with_codec(path, policy, CommaSeparated)
    }
}

impl<C: Codec> DataFile<C> {
    /// Opens a data file at the given path with a custom line codec.
    #[must_use]
    pub const fn with_codec(path: PathBuf, policy: LoadPolicy, codec: C) -> Self {
        Self {
            path,
            policy,
            codec,
        }
    }

    /// The path of the data file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the roster from disk.
    ///
    /// A missing file is not an error: it loads as an empty roster with
    /// [`Loaded::found`] set to `false`. Any other I/O failure is reported,
    /// so callers can avoid later overwriting a file they could not read.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the file exists but cannot be read. Under
    /// [`LoadPolicy::Abort`], also returns the first malformed or duplicate
    /// line.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Loaded, LoadError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("No existing data file found");
                return Ok(Loaded::default());
            }
            Err(source) => {
                return Err(LoadError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let loaded = self.read(BufReader::new(file))?;
        tracing::info!(
            students = loaded.store.len(),
            skipped = loaded.skipped.len(),
            "Data loaded"
        );
        Ok(loaded)
    }

    /// Reads a roster from any line-oriented source.
    ///
    /// Blank lines are ignored and a trailing `\r` is stripped from each
    /// line.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn read<R: BufRead>(&self, reader: R) -> Result<Loaded, LoadError> {
        let mut store = Store::new();
        let mut skipped = Vec::new();

        for (index, raw) in reader.lines().enumerate() {
            let line_number = index + 1;
            let raw = raw.map_err(|source| LoadError::Io {
                path: self.path.clone(),
                source,
            })?;
            let line = raw.strip_suffix('\r').unwrap_or(&raw);
            if line.trim().is_empty() {
                continue;
            }

            if let Err(reason) = self.read_line(&mut store, line_number, line) {
                match self.policy {
                    LoadPolicy::Abort => return Err(reason),
                    LoadPolicy::Skip => {
                        tracing::warn!("Skipping malformed data: {reason}");
                        skipped.push(SkippedLine {
                            line: line_number,
                            reason,
                        });
                    }
                }
            }
        }

        Ok(Loaded {
            store,
            found: true,
            skipped,
        })
    }

    fn read_line(&self, store: &mut Store, line: usize, text: &str) -> Result<(), LoadError> {
        let record: Record = self
            .codec
            .decode(text)
            .map_err(|source| LoadError::Parse { line, source })?;
        let id = record.id().clone();
        store
            .insert(record)
            .map_err(|_| LoadError::DuplicateId { line, id })
    }

    /// Writes every record, one per line, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn write<W: Write>(&self, store: &Store, writer: &mut W) -> io::Result<()> {
        for record in store {
            writeln!(writer, "{}", self.codec.encode(record))?;
        }
        writer.flush()
    }

    /// Saves the roster to disk.
    ///
    /// The snapshot is written to a temporary sibling file and then renamed
    /// over the data file, so a failed save leaves the previous file intact.
    /// Parent directories are created if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be written or renamed.
    #[instrument(skip(self, store), fields(path = %self.path.display(), students = store.len()))]
    pub fn save(&self, store: &Store) -> Result<(), SaveError> {
        let temp_path = self.temp_path();

        let result = self
            .write_to_path(store, &temp_path)
            .and_then(|()| std::fs::rename(&temp_path, &self.path));

        if let Err(source) = result {
            let _ = std::fs::remove_file(&temp_path);
            return Err(SaveError {
                path: self.path.clone(),
                source,
            });
        }

        tracing::info!("Data saved");
        Ok(())
    }

    fn write_to_path(&self, store: &Store, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write(store, &mut writer)?;
        writer.get_ref().sync_all()
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::domain::record::record;

    fn abort(path: PathBuf) -> DataFile {
        DataFile::new(path, LoadPolicy::Abort)
    }

    fn roster() -> Store {
        Store::from_records([
            record("Alice", "S1", &[90.0, 55.0]),
            record("Bob", "S2", &[70.0, 80.0]),
            record("Carol Ann", "S3", &[]),
            record("Dan", "S4", &[66.6, 0.0, 100.0]),
        ])
        .unwrap()
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let file = abort(tmp.path().join("grades.dat"));
        let store = roster();

        file.save(&store).unwrap();
        let loaded = file.load().unwrap();

        assert!(loaded.found);
        assert!(loaded.skipped.is_empty());
        assert_eq!(loaded.store, store);
    }

    #[test]
    fn saved_file_uses_flat_format() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("grades.dat");

        abort(path.clone()).save(&roster()).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Alice,S1,90,55\nBob,S2,70,80\nCarol Ann,S3\nDan,S4,66.6,0,100\n"
        );
        assert!(!tmp.path().join("grades.dat.tmp").exists());
    }

    #[test]
    fn missing_file_loads_empty() {
        let tmp = tempfile::tempdir().unwrap();

        let loaded = abort(tmp.path().join("absent.dat")).load().unwrap();

        assert!(!loaded.found);
        assert!(loaded.store.is_empty());
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();

        // A directory exists but cannot be read as a file.
        let error = abort(tmp.path().to_path_buf()).load().unwrap_err();

        assert!(matches!(error, LoadError::Io { .. }));
    }

    #[test]
    fn blank_lines_and_crlf_are_tolerated() {
        let input = "Alice,S1,90,55\r\n\r\n   \nBob,S2,70,80\n";

        let loaded = abort(PathBuf::new()).read(Cursor::new(input)).unwrap();

        assert_eq!(loaded.store.len(), 2);
        assert_eq!(loaded.store.all()[1].scores(), &[70.0, 80.0]);
    }

    #[test]
    fn abort_policy_stops_at_first_bad_line() {
        let input = "Alice,S1,90\nBob,S2,seventy\nCarol,S3,80\n";

        let error = abort(PathBuf::new()).read(Cursor::new(input)).unwrap_err();

        assert!(matches!(error, LoadError::Parse { line: 2, .. }));
    }

    #[test]
    fn skip_policy_drops_bad_lines() {
        let input = "Alice,S1,90\nBob\nCarol,S3,80\nAgain,S1,10\nDan,S4,101\n";
        let file = DataFile::new(PathBuf::new(), LoadPolicy::Skip);

        let loaded = file.read(Cursor::new(input)).unwrap();

        let ids: Vec<_> = loaded.store.all().iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, ["S1", "S3"]);
        let lines: Vec<_> = loaded.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, [2, 4, 5]);
        assert!(matches!(
            loaded.skipped[1].reason,
            LoadError::DuplicateId { line: 4, .. }
        ));
    }

    #[test]
    fn duplicate_ids_abort_the_load() {
        let input = "Alice,S1,90\nAgain,S1,10\n";

        let error = abort(PathBuf::new()).read(Cursor::new(input)).unwrap_err();

        assert!(matches!(error, LoadError::DuplicateId { line: 2, .. }));
    }

    #[test]
    fn failed_save_keeps_previous_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("grades.dat");
        std::fs::write(&path, "Alice,S1,90\n").unwrap();
        // Occupy the temporary path with a directory so the write fails.
        std::fs::create_dir(tmp.path().join("grades.dat.tmp")).unwrap();

        let error = abort(path.clone()).save(&roster()).unwrap_err();

        assert_eq!(error.path, path);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Alice,S1,90\n");
    }

    #[test]
    fn save_creates_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("term").join("one").join("grades.dat");

        abort(path.clone()).save(&roster()).unwrap();

        assert!(path.exists());
    }
}
