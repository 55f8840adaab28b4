use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Minutes in a day, used for wraparound when a wake time reads earlier than
/// the sleep time.
const MINUTES_PER_DAY: u16 = 24 * 60;

/// An hour of the daytime nap window.
///
/// Valid hours are `7..=19`. Anything outside that window cannot be picked
/// in the editor, so it cannot be represented here either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Hour(u8);

impl Hour {
    /// The first hour of the window.
    pub const MIN: Self = Self(7);

    /// The last hour of the window.
    pub const MAX: Self = Self(19);

    /// Creates a new `Hour`.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::HourOutOfRange`] if the hour is outside `7..=19`.
    pub const fn new(hour: u8) -> Result<Self, TimeError> {
        if hour < Self::MIN.0 || hour > Self::MAX.0 {
            return Err(TimeError::HourOutOfRange(hour));
        }
        Ok(Self(hour))
    }

    /// The numeric hour.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Every hour of the window, in order.
    pub fn all() -> impl Iterator<Item = Self> {
        (Self::MIN.0..=Self::MAX.0).map(Self)
    }

    /// The following hour, or `None` at the end of the window.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        if self.0 >= Self::MAX.0 {
            None
        } else {
            Some(Self(self.0 + 1))
        }
    }
}

impl TryFrom<u8> for Hour {
    type Error = TimeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Hour> for u8 {
    fn from(hour: Hour) -> Self {
        hour.0
    }
}

impl fmt::Display for Hour {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl FromStr for Hour {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hour = s
            .trim()
            .parse::<u8>()
            .map_err(|_| TimeError::Malformed(s.to_string()))?;
        Self::new(hour)
    }
}

/// A quarter-hour minute mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Minute {
    /// `:00`
    #[default]
    Zero,
    /// `:15`
    Fifteen,
    /// `:30`
    Thirty,
    /// `:45`
    FortyFive,
}

impl Minute {
    /// All quarter-hour marks, in order.
    pub const ALL: [Self; 4] = [Self::Zero, Self::Fifteen, Self::Thirty, Self::FortyFive];

    /// Creates a new `Minute`.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::InvalidMinute`] unless the value is 0, 15, 30 or
    /// 45.
    pub const fn new(minute: u8) -> Result<Self, TimeError> {
        match minute {
            0 => Ok(Self::Zero),
            15 => Ok(Self::Fifteen),
            30 => Ok(Self::Thirty),
            45 => Ok(Self::FortyFive),
            other => Err(TimeError::InvalidMinute(other)),
        }
    }

    /// The numeric minute.
    #[must_use]
    pub const fn get(self) -> u8 {
        match self {
            Self::Zero => 0,
            Self::Fifteen => 15,
            Self::Thirty => 30,
            Self::FortyFive => 45,
        }
    }

    /// The following quarter-hour within the same hour, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Zero => Some(Self::Fifteen),
            Self::Fifteen => Some(Self::Thirty),
            Self::Thirty => Some(Self::FortyFive),
            Self::FortyFive => None,
        }
    }
}

impl TryFrom<u8> for Minute {
    type Error = TimeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Minute> for u8 {
    fn from(minute: Minute) -> Self {
        minute.get()
    }
}

impl fmt::Display for Minute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}", self.get())
    }
}

impl FromStr for Minute {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let minute = s
            .trim()
            .parse::<u8>()
            .map_err(|_| TimeError::Malformed(s.to_string()))?;
        Self::new(minute)
    }
}

/// A wall-clock time inside the nap window, e.g. `09:15`.
///
/// Ordering follows the clock: hour first, then minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    hour: Hour,
    minute: Minute,
}

impl ClockTime {
    /// The earliest time of the window (`07:00`).
    pub const START: Self = Self::new(Hour::MIN, Minute::Zero);

    /// The latest time of the window (`19:45`).
    pub const END: Self = Self::new(Hour::MAX, Minute::FortyFive);

    /// Creates a new clock time.
    #[must_use]
    pub const fn new(hour: Hour, minute: Minute) -> Self {
        Self { hour, minute }
    }

    /// The hour component.
    #[must_use]
    pub const fn hour(self) -> Hour {
        self.hour
    }

    /// The minute component.
    #[must_use]
    pub const fn minute(self) -> Minute {
        self.minute
    }

    /// Minutes since midnight.
    #[must_use]
    pub const fn minutes_since_midnight(self) -> u16 {
        self.hour.get() as u16 * 60 + self.minute.get() as u16
    }

    /// The next quarter-hour strictly after this time.
    ///
    /// Rolls into the following hour after `:45`. At the end of the window
    /// there is nothing later to offer, so [`ClockTime::END`] is returned.
    #[must_use]
    pub const fn next_quarter(self) -> Self {
        match self.minute.next() {
            Some(minute) => Self::new(self.hour, minute),
            None => match self.hour.next() {
                Some(hour) => Self::new(hour, Minute::Zero),
                None => Self::END,
            },
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hour, minute) = s
            .split_once(':')
            .ok_or_else(|| TimeError::Malformed(s.to_string()))?;
        Ok(Self::new(hour.parse()?, minute.parse()?))
    }
}

/// The length of a sleep period, rendered as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration {
    minutes: u16,
}

impl Duration {
    /// The time elapsed from `sleep` to `wake`.
    ///
    /// A wake time earlier than the sleep time is read as being on the next
    /// day. Equal times give a zero duration.
    #[must_use]
    pub const fn between(sleep: ClockTime, wake: ClockTime) -> Self {
        let sleep = sleep.minutes_since_midnight();
        let wake = wake.minutes_since_midnight();
        let minutes = if wake < sleep {
            wake + MINUTES_PER_DAY - sleep
        } else {
            wake - sleep
        };
        Self { minutes }
    }

    /// Total length in minutes.
    #[must_use]
    pub const fn total_minutes(self) -> u16 {
        self.minutes
    }

    /// Whether this is the zero duration.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.minutes == 0
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes / 60, self.minutes % 60)
    }
}

/// Errors raised when a clock value is outside the nap window.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TimeError {
    /// The hour is outside `7..=19`.
    #[error("hour {0} is outside the nap window (07-19)")]
    HourOutOfRange(u8),

    /// The minute is not a quarter-hour mark.
    #[error("minute {0} is not one of 00, 15, 30, 45")]
    InvalidMinute(u8),

    /// The text is not a number or not in `HH:MM` form.
    #[error("invalid time '{0}': expected HH:MM")]
    Malformed(String),
}
