//! The signed-in user and what they may do.
//!
//! A [`Session`] is populated once on login from the profile returned by the
//! API, kept in a small JSON file, and cleared on logout. Commands receive
//! the session explicitly instead of reading ambient state.

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// The signed-in user's role, with only the fields that role carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "perfil", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// School administrator.
    Admin {
        /// User id.
        id: String,
        /// Display name.
        nome: String,
        /// Contact email.
        email: String,
    },

    /// Teacher, responsible for some classes.
    #[serde(rename = "PROFESSOR")]
    Teacher {
        /// User id.
        id: String,
        /// Display name.
        nome: String,
        /// Contact email.
        email: String,
        /// Classes taught.
        #[serde(default)]
        turmas: Vec<String>,
    },

    /// Parent or guardian of some students.
    #[serde(rename = "RESPONSAVEL")]
    Guardian {
        /// User id.
        id: String,
        /// Display name.
        nome: String,
        /// Contact email.
        email: String,
        /// Students in their care.
        #[serde(default)]
        alunos: Vec<String>,
    },
}

impl Role {
    /// The user's display name.
    #[must_use]
    pub fn nome(&self) -> &str {
        match self {
            Self::Admin { nome, .. } | Self::Teacher { nome, .. } | Self::Guardian { nome, .. } => {
                nome
            }
        }
    }

    /// The user's id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Admin { id, .. } | Self::Teacher { id, .. } | Self::Guardian { id, .. } => id,
        }
    }

    /// Short label for the role.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Admin { .. } => "Administrador",
            Self::Teacher { .. } => "Professor",
            Self::Guardian { .. } => "Responsável",
        }
    }

    /// Whether this role may write daily logs.
    #[must_use]
    pub const fn can_write_diario(&self) -> bool {
        matches!(self, Self::Admin { .. } | Self::Teacher { .. })
    }

    /// Whether this role may read the daily logs of a student.
    ///
    /// Staff can read every log. Guardians can only read the logs of the
    /// students linked to their profile.
    #[must_use]
    pub fn can_view_aluno(&self, aluno_id: &str) -> bool {
        match self {
            Self::Admin { .. } | Self::Teacher { .. } => true,
            Self::Guardian { alunos, .. } => alunos.iter().any(|a| a == aluno_id),
        }
    }
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    token: String,
    user: Role,
}

/// Errors raised while loading, resolving or persisting a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No one is signed in.
    #[error("not logged in: run 'elo login' first")]
    NotLoggedIn,

    /// The session or profile file could not be read or written.
    #[error("failed to access session file: {0}")]
    Io(#[from] io::Error),

    /// The profile did not match any known role.
    #[error("unrecognised user profile: {0}")]
    Profile(#[from] serde_json::Error),

    /// The session is signed in but its role is not allowed to do this.
    #[error("{role} '{nome}' is not allowed to {action}")]
    Forbidden {
        /// Role label.
        role: &'static str,
        /// User display name.
        nome: String,
        /// What was attempted.
        action: &'static str,
    },
}

impl Session {
    /// Builds a session from a token and the raw profile JSON returned by
    /// the API.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Profile`] if the profile does not describe a
    /// known role.
    pub fn from_profile(token: String, profile: &str) -> Result<Self, SessionError> {
        let user: Role = serde_json::from_str(profile)?;
        debug!(role = user.label(), id = user.id(), "resolved profile");
        Ok(Self { token, user })
    }

    /// The bearer token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The signed-in user.
    #[must_use]
    pub const fn user(&self) -> &Role {
        &self.user
    }

    /// Fails unless the user may write daily logs.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Forbidden`] for guardians.
    pub fn require_writer(&self) -> Result<&Role, SessionError> {
        if self.user.can_write_diario() {
            Ok(&self.user)
        } else {
            Err(self.forbidden("write daily logs"))
        }
    }

    /// Fails unless the user may read the given student's logs.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Forbidden`] for guardians of other students.
    pub fn require_viewer(&self, aluno_id: &str) -> Result<&Role, SessionError> {
        if self.user.can_view_aluno(aluno_id) {
            Ok(&self.user)
        } else {
            Err(self.forbidden("view this student's daily logs"))
        }
    }

    fn forbidden(&self, action: &'static str) -> SessionError {
        SessionError::Forbidden {
            role: self.user.label(),
            nome: self.user.nome().to_string(),
            action,
        }
    }

    /// Loads the session saved at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotLoggedIn`] if there is no session file, or
    /// another error if it cannot be read or parsed.
    #[instrument]
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(SessionError::NotLoggedIn),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    /// Saves the session to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    #[instrument(skip(self))]
    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Removes the session saved at `path`.
    ///
    /// Returns `false` if no one was signed in.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    #[instrument]
    pub fn clear(path: &Path) -> Result<bool, SessionError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
