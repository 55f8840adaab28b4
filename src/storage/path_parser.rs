//! Path utilities for stored logs
//!
//! Each log lives at `<records_dir>/<ALUNO>/<YYYY-MM-DD>.yaml`, so the
//! student and the day can be recovered from the path alone.

use std::{
    fmt,
    path::{Component, Path, PathBuf},
};

use chrono::NaiveDate;

/// File extension of stored logs.
pub const EXTENSION: &str = "yaml";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Identifies one stored log: a student and a day.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    aluno_id: String,
    data: NaiveDate,
}

impl RecordKey {
    /// Creates a key.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidAluno`] if the student id is empty or
    /// contains anything other than ASCII letters, digits, `-` and `_`. The
    /// id becomes a directory name, so anything else is refused.
    pub fn new(aluno_id: impl Into<String>, data: NaiveDate) -> Result<Self, ParseError> {
        let aluno_id = aluno_id.into();
        if aluno_id.is_empty()
            || !aluno_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ParseError::InvalidAluno(aluno_id));
        }
        Ok(Self { aluno_id, data })
    }

    /// The student id.
    #[must_use]
    pub fn aluno_id(&self) -> &str {
        &self.aluno_id
    }

    /// The day.
    #[must_use]
    pub const fn data(&self) -> NaiveDate {
        self.data
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}@{}", self.aluno_id, self.data.format(DATE_FORMAT))
    }
}

/// Parse a day from `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns [`ParseError::InvalidDate`] if the text is not a calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| ParseError::InvalidDate(s.to_string()))
}

/// Construct the file path of a stored log.
#[must_use]
pub fn construct_path_from_key(records_dir: &Path, key: &RecordKey) -> PathBuf {
    records_dir
        .join(&key.aluno_id)
        .join(key.data.format(DATE_FORMAT).to_string())
        .with_extension(EXTENSION)
}

/// Parse the key of a stored log from its path.
///
/// # Errors
///
/// Returns an error if the path is not `<records_dir>/<ALUNO>/<DATE>.yaml`.
pub fn parse_key_from_path(path: &Path, records_dir: &Path) -> Result<RecordKey, ParseError> {
    let rel_path = path
        .strip_prefix(records_dir)
        .map_err(|_| ParseError::InvalidPath)?;

    if rel_path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
        return Err(ParseError::InvalidPath);
    }

    let components: Vec<&str> = rel_path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();

    let [aluno, _file] = components.as_slice() else {
        return Err(ParseError::InvalidPath);
    };

    let stem = rel_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or(ParseError::InvalidPath)?;

    RecordKey::new(*aluno, parse_date(stem)?)
}

/// Errors that can occur during path parsing
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    /// The path does not follow the `<ALUNO>/<DATE>.yaml` layout.
    #[error("Invalid file path")]
    InvalidPath,

    /// The student id cannot be used as a directory name.
    #[error("Invalid student id '{0}': use letters, digits, '-' or '_'")]
    InvalidAluno(String),

    /// The date is not `YYYY-MM-DD`.
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
}
