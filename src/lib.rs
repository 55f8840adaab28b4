//! Daily childcare logs for Elo Escola
//!
//! A "diário" records how a child ate, slept and behaved over one day. Logs
//! are filled in through a step-by-step [`Wizard`], with sleep periods
//! composed in a [`SleepEditor`].

pub mod domain;
pub use domain::{
    Config, Diario, DiarioFormData, DiarioSaver, Role, Session, SleepEditor, SleepPeriod, Step,
    Wizard,
};

/// Filesystem storage of submitted logs.
pub mod storage;
pub use storage::{Directory, RecordKey};
