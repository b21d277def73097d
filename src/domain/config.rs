use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::record::PASS_MARK;

/// What to do with a line of the data file that cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPolicy {
    /// Fail the whole load, leaving the previous roster in place.
    #[default]
    Abort,
    /// Log a warning and drop the line.
    Skip,
}

/// Configuration for the gradebook.
///
/// Every setting has a default, so a missing configuration file is never an
/// error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The file the roster is loaded from and saved to.
    data_file: PathBuf,

    /// The lowest score that counts as a pass when listing failed students.
    pass_mark: f64,

    /// How malformed lines in the data file are handled.
    pub on_malformed: LoadPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            pass_mark: PASS_MARK,
            on_malformed: LoadPolicy::default(),
        }
    }
}

/// Errors that can occur when reading or writing the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("failed to access config file {path}")]
    Io {
        /// The configuration file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this configuration.
    #[error("failed to parse config file {path}")]
    Parse {
        /// The configuration file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: toml::de::Error,
    },

    /// The configuration could not be serialized.
    #[error("failed to serialize config")]
    Serialize(#[from] toml::ser::Error),
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the configuration, falling back to the defaults if the file does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::debug!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            result => result,
        }
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Returns the path of the data file.
    #[must_use]
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Overrides the data file path.
    pub fn set_data_file(&mut self, path: PathBuf) {
        self.data_file = path;
    }

    /// Returns the pass mark.
    #[must_use]
    pub const fn pass_mark(&self) -> f64 {
        self.pass_mark
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from("grades.dat")
}

const fn default_pass_mark() -> f64 {
    PASS_MARK
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_data_file")]
        data_file: PathBuf,

        /// Scores strictly below this mark count as a fail.
        #[serde(default = "default_pass_mark")]
        pass_mark: f64,

        #[serde(default)]
        on_malformed: LoadPolicy,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                data_file,
                pass_mark,
                on_malformed,
            } => Self {
                data_file,
                pass_mark,
                on_malformed,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            data_file: config.data_file,
            pass_mark: config.pass_mark,
            on_malformed: config.on_malformed,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\ndata_file = \"class-a.dat\"\npass_mark = 50.0\non_malformed = \"skip\"\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.data_file(), Path::new("class-a.dat"));
        assert!((config.pass_mark() - 50.0).abs() < f64::EPSILON);
        assert_eq!(config.on_malformed, LoadPolicy::Skip);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(matches!(error, ConfigError::Io { .. }));
    }

    #[test]
    fn load_or_default_tolerates_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        assert_eq!(Config::load_or_default(&missing).unwrap(), Config::default());
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\npass_mark = \"sixty\"\n")
            .unwrap();

        let error = Config::load_or_default(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn empty_file_returns_default() {
        // Tests that deserialising an empty file returns the default configuration.
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("gradebook.toml");
        let mut config = Config::default();
        config.set_data_file(PathBuf::from("other.dat"));
        config.on_malformed = LoadPolicy::Skip;

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
