use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for a daily log workspace.
///
/// Stored as TOML in `.elo/config.toml` at the workspace root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Directory holding the stored logs, relative to the workspace root.
    records_dir: PathBuf,

    /// File holding the signed-in session, relative to the workspace root.
    session_file: PathBuf,

    /// Whether to skip files in the records directory that are not valid
    /// logs, rather than failing to load.
    pub allow_unrecognised: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            records_dir: default_records_dir(),
            session_file: default_session_file(),
            allow_unrecognised: false,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Directory holding the stored logs, relative to the workspace root.
    #[must_use]
    pub fn records_dir(&self) -> &Path {
        &self.records_dir
    }

    /// Sets the records directory.
    pub fn set_records_dir(&mut self, dir: PathBuf) {
        self.records_dir = dir;
    }

    /// File holding the signed-in session, relative to the workspace root.
    #[must_use]
    pub fn session_file(&self) -> &Path {
        &self.session_file
    }
}

fn default_records_dir() -> PathBuf {
    PathBuf::from("diarios")
}

fn default_session_file() -> PathBuf {
    PathBuf::from(".elo/session.json")
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_records_dir")]
        records_dir: PathBuf,

        #[serde(default = "default_session_file")]
        session_file: PathBuf,

        #[serde(default)]
        allow_unrecognised: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                records_dir,
                session_file,
                allow_unrecognised,
            } => Self {
                records_dir,
                session_file,
                allow_unrecognised,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            records_dir: config.records_dir,
            session_file: config.session_file,
            allow_unrecognised: config.allow_unrecognised,
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
            b"_version = \"1\"\nrecords_dir = \"logs\"\nsession_file = \"auth.json\"\nallow_unrecognised = true\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.records_dir(), Path::new("logs"));
        assert_eq!(config.session_file(), Path::new("auth.json"));
        assert!(config.allow_unrecognised);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nallow_unrecognised = \"yes\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        let mut config = Config::default();
        config.set_records_dir(PathBuf::from("registros"));

        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
