//! Domain models for the daily log.
//!
//! This module contains the core domain types including clock values, sleep
//! periods and their editor, the daily log record, the step-by-step wizard,
//! the signed-in session, and configuration.

/// Clock values restricted to the nap window.
pub mod clock;
pub use clock::{ClockTime, Duration, Hour, Minute, TimeError};

/// Sleep periods and the editor used to compose them.
pub mod sleep;
pub use sleep::{InvalidSleepPeriod, SleepEditor, SleepPeriod};

pub mod diario;
pub use diario::{
    Diario, DiarioFormData, Disposicao, Evacuacao, ItemRequisitado, Meal, Refeicao,
};

pub mod wizard;
pub use wizard::{Back, DiarioSaver, Step, SubmitError, Wizard, WizardError};

pub mod session;
pub use session::{Role, Session, SessionError};

mod config;
pub use config::Config;
