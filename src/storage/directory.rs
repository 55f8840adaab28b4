//! A filesystem backed store of daily logs
//!
//! The [`Directory`] keeps one YAML file per student per day. It doubles as
//! the [`DiarioSaver`] the wizard submits to when no remote API is in
//! reach.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::instrument;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::{
    domain::{Config, Diario, DiarioFormData, DiarioSaver, SleepEditor},
    storage::path_parser::{construct_path_from_key, parse_key_from_path, RecordKey},
};

/// Directory holding workspace metadata (configuration, session).
pub const META_DIR: &str = ".elo";

/// A filesystem backed store of daily logs.
#[derive(Debug, Clone)]
pub struct Directory {
    /// The workspace root.
    root: PathBuf,
    config: Config,
}

impl Directory {
    /// Opens the workspace at the given path.
    ///
    /// Falls back to the default configuration if `.elo/config.toml` is
    /// missing or unreadable.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        let config = load_config(&root);
        Self { root, config }
    }

    /// The workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Absolute path of the records directory.
    #[must_use]
    pub fn records_dir(&self) -> PathBuf {
        self.root.join(self.config.records_dir())
    }

    /// Absolute path of the session file.
    #[must_use]
    pub fn session_path(&self) -> PathBuf {
        self.root.join(self.config.session_file())
    }

    /// Where the log for `key` is (or would be) stored.
    #[must_use]
    pub fn path_for(&self, key: &RecordKey) -> PathBuf {
        construct_path_from_key(&self.records_dir(), key)
    }

    /// Loads the log for `key`, if one has been stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    #[instrument(skip(self))]
    pub fn load(&self, key: &RecordKey) -> Result<Option<Diario>, LoadError> {
        let path = self.path_for(key);
        match read_record(&path) {
            Ok(record) => Ok(Some(record)),
            Err(LoadError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Writes a log, replacing any previous log for the same student and day.
    ///
    /// Parent directories are created automatically if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the record's student id is not a valid key, or if
    /// the file cannot be written.
    #[instrument(skip(self, record), fields(aluno = %record.aluno_id, data = %record.data))]
    pub fn save(&self, record: &Diario) -> Result<PathBuf, SaveError> {
        let key = RecordKey::new(record.aluno_id.clone(), record.data)?;
        let path = self.path_for(&key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(record)?;
        fs::write(&path, content)?;
        tracing::info!("Saved diário to {}", path.display());
        Ok(path)
    }

    /// Load every stored log, ordered by student then day.
    ///
    /// # Errors
    ///
    /// If `allow_unrecognised` is `true`, files that are not valid logs are
    /// skipped. Otherwise (the default) any such file is an error.
    pub fn load_all(&self) -> Result<Vec<Diario>, DirectoryLoadError> {
        let records_dir = self.records_dir();
        let paths = collect_record_paths(&records_dir);

        let (records, unrecognised): (Vec<_>, Vec<_>) = paths
            .par_iter()
            .map(|path| try_load_record(path, &records_dir))
            .partition(Result::is_ok);

        let mut records: Vec<Diario> = records.into_iter().filter_map(Result::ok).collect();
        let unrecognised: Vec<PathBuf> = unrecognised.into_iter().filter_map(Result::err).collect();

        if !self.config.allow_unrecognised && !unrecognised.is_empty() {
            return Err(DirectoryLoadError::UnrecognisedFiles(unrecognised));
        }

        records.sort_by(|a, b| (&a.aluno_id, a.data).cmp(&(&b.aluno_id, b.data)));
        Ok(records)
    }

    /// Removes one sleep period from a stored log.
    ///
    /// Returns `false`, without touching the file, if the log has no period
    /// with that id.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no stored log for `key`, or if it cannot
    /// be read or rewritten.
    #[instrument(skip(self))]
    pub fn remove_sleep_period(&self, key: &RecordKey, id: Uuid) -> Result<bool, EditError> {
        let mut record = self
            .load(key)?
            .ok_or_else(|| EditError::NotFound(key.clone()))?;

        if !SleepEditor::remove(&mut record.form.sono, id) {
            tracing::debug!("No sleep period {id} in {key}");
            return Ok(false);
        }

        self.save(&record)?;
        Ok(true)
    }

    /// A saver that stores submitted forms as the log for `key`.
    #[must_use]
    pub const fn saver<'a>(&'a self, key: &'a RecordKey, autor: &'a str) -> RecordSaver<'a> {
        RecordSaver {
            directory: self,
            key,
            autor,
        }
    }
}

/// Stores submitted forms in a [`Directory`] under a fixed key.
#[derive(Debug)]
pub struct RecordSaver<'a> {
    directory: &'a Directory,
    key: &'a RecordKey,
    autor: &'a str,
}

impl DiarioSaver for RecordSaver<'_> {
    type Output = PathBuf;
    type Error = SaveError;

    fn save(&mut self, form: &DiarioFormData) -> Result<PathBuf, SaveError> {
        let record = Diario::new(
            self.key.aluno_id().to_string(),
            self.key.data(),
            self.autor.to_string(),
            form.clone(),
        );
        self.directory.save(&record)
    }
}

fn read_record(path: &Path) -> Result<Diario, LoadError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

fn collect_record_paths(records_dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(records_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            // Skip hidden files (editor swap files and the like)
            !entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with('.'))
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}

fn try_load_record(path: &Path, records_dir: &Path) -> Result<Diario, PathBuf> {
    let key = match parse_key_from_path(path, records_dir) {
        Ok(key) => key,
        Err(e) => {
            tracing::debug!("Skipping unrecognised file at {}: {e}", path.display());
            return Err(path.to_path_buf());
        }
    };

    match read_record(path) {
        Ok(record) if record.aluno_id == key.aluno_id() && record.data == key.data() => Ok(record),
        Ok(record) => {
            tracing::debug!(
                "Record at {} claims to be {}@{}",
                path.display(),
                record.aluno_id,
                record.data
            );
            Err(path.to_path_buf())
        }
        Err(e) => {
            tracing::debug!("Failed to load diário from {}: {e}", path.display());
            Err(path.to_path_buf())
        }
    }
}

fn load_config(root: &Path) -> Config {
    let path = root.join(META_DIR).join("config.toml");
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

/// Errors that can occur when reading a stored log.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// An I/O error occurred.
    #[error("failed to read diário: {0}")]
    Io(#[from] io::Error),
    /// The YAML could not be parsed.
    #[error("failed to parse diário: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors that can occur when writing a log.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// The record cannot be mapped to a file path.
    #[error(transparent)]
    Key(#[from] crate::storage::path_parser::ParseError),
    /// An I/O error occurred.
    #[error("failed to write diário: {0}")]
    Io(#[from] io::Error),
    /// The record could not be serialized.
    #[error("failed to serialize diário: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors that can occur when editing a stored log in place.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// There is no stored log for the key.
    #[error("no diário stored for {0}")]
    NotFound(RecordKey),
    /// The stored log could not be read.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The edited log could not be written back.
    #[error(transparent)]
    Save(#[from] SaveError),
}

/// Errors that can occur when loading the whole store.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryLoadError {
    /// Files in the records directory that are not valid logs.
    UnrecognisedFiles(Vec<PathBuf>),
}

impl fmt::Display for DirectoryLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognisedFiles(paths) => {
                write!(f, "Unrecognised files: ")?;
                for (i, path) in paths.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", path.display())?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;
    use crate::domain::{ClockTime, Refeicao, SleepPeriod, Wizard};

    fn setup() -> (TempDir, Directory) {
        let tmp = TempDir::new().unwrap();
        let directory = Directory::new(tmp.path().to_path_buf());
        (tmp, directory)
    }

    fn key(aluno: &str, day: u32) -> RecordKey {
        RecordKey::new(aluno, NaiveDate::from_ymd_opt(2024, 5, day).unwrap()).unwrap()
    }

    fn period(sleep: &str, wake: &str) -> SleepPeriod {
        let sleep: ClockTime = sleep.parse().unwrap();
        let wake: ClockTime = wake.parse().unwrap();
        SleepPeriod::new(sleep, wake)
    }

    fn record(key: &RecordKey, form: DiarioFormData) -> Diario {
        Diario::new(key.aluno_id().to_string(), key.data(), "Marta".to_string(), form)
    }

    #[test]
    fn load_missing_record_is_none() {
        let (_tmp, directory) = setup();
        assert!(directory.load(&key("aluno-1", 1)).unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let (_tmp, directory) = setup();
        let key = key("aluno-1", 2);
        let form = DiarioFormData {
            almoco: Refeicao::Regular,
            sono: vec![period("09:00", "10:15")],
            observacoes: "Brincou bastante".to_string(),
            ..DiarioFormData::default()
        };
        let saved = record(&key, form);

        let path = directory.save(&saved).unwrap();
        assert!(path.ends_with("diarios/aluno-1/2024-05-02.yaml"));
        assert_eq!(directory.load(&key).unwrap(), Some(saved));
    }

    #[test]
    fn save_rejects_unsafe_student_id() {
        let (_tmp, directory) = setup();
        let mut bad = record(&key("aluno-1", 2), DiarioFormData::default());
        bad.aluno_id = "../fora".to_string();
        assert!(matches!(directory.save(&bad), Err(SaveError::Key(_))));
    }

    #[test]
    fn load_rejects_zero_length_sleep_period() {
        let (tmp, directory) = setup();
        let key = key("aluno-1", 8);
        let dir = tmp.path().join("diarios/aluno-1");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("2024-05-08.yaml"),
            r"alunoId: aluno-1
data: 2024-05-08
autor: Marta
atualizadoEm: 2024-05-08T15:00:00Z
sono:
- id: 5f0c1d3e-8d8b-4c4e-9a57-1f0e2b9c7a10
  sleepHour: 10
  sleepMinute: 30
  wakeHour: 10
  wakeMinute: 30
  horaDormiu: '07:00'
  horaAcordou: bogus
  tempoTotal: '99:99'
",
        )
        .unwrap();

        assert!(matches!(directory.load(&key), Err(LoadError::Yaml(_))));
    }

    #[test]
    fn load_all_sorts_by_student_then_day() {
        let (_tmp, directory) = setup();
        for k in [key("b", 3), key("a", 9), key("a", 1)] {
            directory
                .save(&record(&k, DiarioFormData::default()))
                .unwrap();
        }

        let keys: Vec<(String, u32)> = directory
            .load_all()
            .unwrap()
            .into_iter()
            .map(|r| (r.aluno_id, chrono::Datelike::day(&r.data)))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("a".to_string(), 1),
                ("a".to_string(), 9),
                ("b".to_string(), 3)
            ]
        );
    }

    #[test]
    fn load_all_rejects_stray_files_unless_allowed() {
        let (tmp, mut directory) = setup();
        directory
            .save(&record(&key("a", 1), DiarioFormData::default()))
            .unwrap();
        let stray = tmp.path().join("diarios/a/notes.txt");
        fs::write(&stray, "hello").unwrap();

        match directory.load_all() {
            Err(DirectoryLoadError::UnrecognisedFiles(paths)) => assert_eq!(paths, vec![stray]),
            other => panic!("expected unrecognised files, got {other:?}"),
        }

        directory.config.allow_unrecognised = true;
        assert_eq!(directory.load_all().unwrap().len(), 1);
    }

    #[test]
    fn load_all_on_empty_workspace() {
        let (_tmp, directory) = setup();
        assert!(directory.load_all().unwrap().is_empty());
    }

    #[test]
    fn wizard_submits_through_record_saver() {
        let (_tmp, directory) = setup();
        let key = key("aluno-3", 4);
        let mut wizard = Wizard::new();
        wizard.set_evacuacao(crate::domain::Evacuacao::Dura);
        while wizard.has_next() {
            wizard.next().unwrap();
        }

        let path = wizard
            .submit(&mut directory.saver(&key, "Marta"))
            .unwrap();

        assert_eq!(path, directory.path_for(&key));
        let stored = directory.load(&key).unwrap().unwrap();
        assert_eq!(stored.autor, "Marta");
        assert_eq!(&stored.form, wizard.data());
    }

    #[test]
    fn remove_sleep_period_rewrites_record() {
        let (_tmp, directory) = setup();
        let key = key("aluno-1", 6);
        let a = period("08:00", "09:00");
        let b = period("13:00", "14:30");
        directory
            .save(&record(
                &key,
                DiarioFormData {
                    sono: vec![a.clone(), b.clone()],
                    ..DiarioFormData::default()
                },
            ))
            .unwrap();

        assert!(directory.remove_sleep_period(&key, a.id()).unwrap());
        assert_eq!(directory.load(&key).unwrap().unwrap().form.sono, vec![b]);
    }

    #[test]
    fn remove_unknown_sleep_period_is_a_noop() {
        let (_tmp, directory) = setup();
        let key = key("aluno-1", 7);
        let saved = record(
            &key,
            DiarioFormData {
                sono: vec![period("08:00", "09:00")],
                ..DiarioFormData::default()
            },
        );
        directory.save(&saved).unwrap();

        assert!(!directory.remove_sleep_period(&key, Uuid::new_v4()).unwrap());
        assert_eq!(directory.load(&key).unwrap(), Some(saved));
    }

    #[test]
    fn remove_from_missing_record_fails() {
        let (_tmp, directory) = setup();
        assert!(matches!(
            directory.remove_sleep_period(&key("x", 1), Uuid::new_v4()),
            Err(EditError::NotFound(_))
        ));
    }

    #[test]
    fn reads_config_from_meta_dir() {
        let (tmp, _) = setup();
        fs::create_dir_all(tmp.path().join(META_DIR)).unwrap();
        fs::write(
            tmp.path().join(META_DIR).join("config.toml"),
            "_version = \"1\"\nrecords_dir = \"registros\"\n",
        )
        .unwrap();

        let directory = Directory::new(tmp.path().to_path_buf());
        assert_eq!(directory.records_dir(), tmp.path().join("registros"));
    }
}
