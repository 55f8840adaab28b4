//! Sleep periods and the editor used to compose them.
//!
//! The [`SleepEditor`] holds a draft interval ("slept at X, woke at Y") and
//! appends finished [`SleepPeriod`]s to a list owned by the caller. Invalid
//! input is never rejected after the fact: options that would produce an
//! invalid draft are reported as disabled, and selecting them does nothing.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::clock::{ClockTime, Duration, Hour, Minute};

/// Warning shown while the draft cannot be added.
pub const EQUAL_TIMES_WARNING: &str = "O horário de dormir e de acordar não podem ser iguais";

/// One recorded sleep interval.
///
/// Periods are immutable once created. The rendered `HH:MM` strings and the
/// total duration are computed at creation and stored alongside the numeric
/// fields, matching the record the remote API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawSleepPeriod")]
pub struct SleepPeriod {
    id: Uuid,
    sleep_hour: Hour,
    sleep_minute: Minute,
    wake_hour: Hour,
    wake_minute: Minute,
    hora_dormiu: String,
    hora_acordou: String,
    tempo_total: String,
    #[serde(default = "finalized_by_default")]
    salvo: bool,
}

const fn finalized_by_default() -> bool {
    true
}

/// A sleep period as stored, before its invariants are checked.
///
/// The rendered `horaDormiu`, `horaAcordou` and `tempoTotal` strings are not
/// read back; they are recomputed from the numeric fields.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSleepPeriod {
    id: Uuid,
    sleep_hour: Hour,
    sleep_minute: Minute,
    wake_hour: Hour,
    wake_minute: Minute,
    #[serde(default = "finalized_by_default")]
    salvo: bool,
}

impl TryFrom<RawSleepPeriod> for SleepPeriod {
    type Error = InvalidSleepPeriod;

    fn try_from(raw: RawSleepPeriod) -> Result<Self, Self::Error> {
        let sleep = ClockTime::new(raw.sleep_hour, raw.sleep_minute);
        let wake = ClockTime::new(raw.wake_hour, raw.wake_minute);
        if sleep == wake {
            return Err(InvalidSleepPeriod::EqualTimes(sleep));
        }
        Ok(Self {
            salvo: raw.salvo,
            ..Self::new_with_id(raw.id, sleep, wake)
        })
    }
}

/// A stored sleep period that breaks the period invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSleepPeriod {
    /// Sleep and wake are the same time, giving a zero-length period.
    #[error("sleep period starts and ends at {0}")]
    EqualTimes(ClockTime),
}

impl SleepPeriod {
    /// Construct a finalized period from a sleep and wake time.
    ///
    /// A new UUID is automatically generated.
    #[must_use]
    pub(crate) fn new(sleep: ClockTime, wake: ClockTime) -> Self {
        Self::new_with_id(Uuid::new_v4(), sleep, wake)
    }

    pub(crate) fn new_with_id(id: Uuid, sleep: ClockTime, wake: ClockTime) -> Self {
        Self {
            id,
            sleep_hour: sleep.hour(),
            sleep_minute: sleep.minute(),
            wake_hour: wake.hour(),
            wake_minute: wake.minute(),
            hora_dormiu: sleep.to_string(),
            hora_acordou: wake.to_string(),
            tempo_total: Duration::between(sleep, wake).to_string(),
            salvo: true,
        }
    }

    /// The unique identifier of this period.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// When the subject fell asleep.
    #[must_use]
    pub const fn sleep(&self) -> ClockTime {
        ClockTime::new(self.sleep_hour, self.sleep_minute)
    }

    /// When the subject woke up.
    #[must_use]
    pub const fn wake(&self) -> ClockTime {
        ClockTime::new(self.wake_hour, self.wake_minute)
    }

    /// The sleep time as stored, `HH:MM`.
    #[must_use]
    pub fn hora_dormiu(&self) -> &str {
        &self.hora_dormiu
    }

    /// The wake time as stored, `HH:MM`.
    #[must_use]
    pub fn hora_acordou(&self) -> &str {
        &self.hora_acordou
    }

    /// The duration computed when the period was created, `HH:MM`.
    #[must_use]
    pub fn tempo_total(&self) -> &str {
        &self.tempo_total
    }

    /// Whether this period was finalized by the editor.
    ///
    /// Records loaded from elsewhere may carry unfinalized entries; these are
    /// dropped when the wizard leaves the sleep step.
    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        self.salvo
    }
}

/// The interval currently being composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draft {
    /// Candidate sleep time.
    pub sleep: ClockTime,
    /// Candidate wake time.
    pub wake: ClockTime,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            sleep: ClockTime::START,
            wake: ClockTime::START.next_quarter(),
        }
    }
}

/// Composes sleep periods one at a time.
///
/// The editor owns only the draft. The list of accepted periods belongs to
/// the caller and is passed in to [`SleepEditor::add`] and
/// [`SleepEditor::remove`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SleepEditor {
    draft: Draft,
}

impl SleepEditor {
    /// Creates an editor with the default draft (`07:00` to `07:15`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current draft.
    #[must_use]
    pub const fn draft(&self) -> Draft {
        self.draft
    }

    /// Selects the draft sleep hour, keeping the sleep minute.
    pub fn select_sleep_hour(&mut self, hour: Hour) {
        self.set_sleep(ClockTime::new(hour, self.draft.sleep.minute()));
    }

    /// Selects the draft sleep minute, keeping the sleep hour.
    pub fn select_sleep_minute(&mut self, minute: Minute) {
        self.set_sleep(ClockTime::new(self.draft.sleep.hour(), minute));
    }

    /// Sets the sleep time, pushing the wake time past it if needed.
    fn set_sleep(&mut self, sleep: ClockTime) {
        self.draft.sleep = sleep;
        if self.draft.wake <= sleep {
            let wake = sleep.next_quarter();
            debug!(%sleep, from = %self.draft.wake, to = %wake, "advancing wake time");
            self.draft.wake = wake;
        }
    }

    /// Selects the draft wake hour, keeping the wake minute.
    ///
    /// Returns `false` and leaves the draft untouched when the hour is
    /// disabled.
    pub fn select_wake_hour(&mut self, hour: Hour) -> bool {
        if self.is_wake_hour_disabled(hour) {
            return false;
        }
        self.draft.wake = ClockTime::new(hour, self.draft.wake.minute());
        true
    }

    /// Selects the draft wake minute at the current wake hour.
    ///
    /// Returns `false` and leaves the draft untouched when the minute is
    /// disabled.
    pub fn select_wake_minute(&mut self, minute: Minute) -> bool {
        if self.is_wake_minute_disabled(minute) {
            return false;
        }
        self.draft.wake = ClockTime::new(self.draft.wake.hour(), minute);
        true
    }

    /// Whether a wake hour is disabled.
    ///
    /// Only hours strictly before the sleep hour are blocked. The sleep hour
    /// itself stays selectable; the minute grid enforces the rest.
    #[must_use]
    pub fn is_wake_hour_disabled(&self, hour: Hour) -> bool {
        hour < self.draft.sleep.hour()
    }

    /// Whether a wake minute is disabled at the currently selected wake hour.
    #[must_use]
    pub fn is_wake_minute_disabled(&self, minute: Minute) -> bool {
        let sleep = self.draft.sleep;
        let hour = self.draft.wake.hour();
        (hour == sleep.hour() && minute <= sleep.minute()) || hour < sleep.hour()
    }

    /// Duration of the current draft.
    #[must_use]
    pub const fn draft_duration(&self) -> Duration {
        Duration::between(self.draft.sleep, self.draft.wake)
    }

    /// Whether the draft can be added.
    #[must_use]
    pub fn can_add(&self) -> bool {
        self.draft.sleep != self.draft.wake
    }

    /// The warning to show while the draft cannot be added.
    #[must_use]
    pub fn warning(&self) -> Option<&'static str> {
        (!self.can_add()).then_some(EQUAL_TIMES_WARNING)
    }

    /// Appends the draft to `periods` as a new finalized period.
    ///
    /// Does nothing and returns `None` when sleep and wake are equal. The
    /// draft is kept so that consecutive periods can be entered by changing
    /// a single field.
    #[instrument(skip(periods), fields(sleep = %self.draft.sleep, wake = %self.draft.wake))]
    pub fn add<'a>(&self, periods: &'a mut Vec<SleepPeriod>) -> Option<&'a SleepPeriod> {
        if !self.can_add() {
            debug!("refusing to add zero-length period");
            return None;
        }
        periods.push(SleepPeriod::new(self.draft.sleep, self.draft.wake));
        periods.last()
    }

    /// Removes the period with the given id.
    ///
    /// Returns `true` if a period was removed.
    pub fn remove(periods: &mut Vec<SleepPeriod>, id: Uuid) -> bool {
        let before = periods.len();
        periods.retain(|period| period.id != id);
        before != periods.len()
    }
}
