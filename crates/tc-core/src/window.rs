//! Closed time windows.
//!
//! A [`Window`] covers `[start, end]` with both ends inclusive: a punch exactly
//! on either boundary belongs to the window. Calendar ranges are computed in
//! UTC; callers that need local days convert before building a window.

use std::fmt;

use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors building a window.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// The window starts after it ends.
    #[error("window start {start} is after end {end}")]
    Inverted {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Date arithmetic left the representable range.
    #[error("window boundary is out of range")]
    OutOfRange,
}

/// A closed interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawWindow> for Window {
    type Error = WindowError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl Window {
    /// Creates a window, rejecting `start > end`.
    ///
    /// A zero-length window (`start == end`) is valid.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, WindowError> {
        if start > end {
            return Err(WindowError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates the window running `length` back from `end`.
    pub fn ending_at(end: DateTime<Utc>, length: Duration) -> Result<Self, WindowError> {
        let start = end
            .checked_sub_signed(length)
            .ok_or(WindowError::OutOfRange)?;
        Self::new(start, end)
    }

    /// Covers whole UTC days from `first` through `last`.
    fn days(first: NaiveDate, last: NaiveDate) -> Result<Self, WindowError> {
        let next = last.checked_add_days(Days::new(1)).ok_or(WindowError::OutOfRange)?;
        Self::new(midnight(first), midnight(next) - Duration::nanoseconds(1))
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Calendar ranges relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarRange {
    /// The current day.
    Today,
    /// The last seven days, including today.
    PastWeek,
    /// The last fourteen days, including today.
    PastTwoWeeks,
    /// The current calendar month.
    Month,
    /// The current calendar year.
    Year,
}

impl CalendarRange {
    /// Resolves the range to a window around `now`.
    pub fn window(self, now: DateTime<Utc>) -> Result<Window, WindowError> {
        let today = now.date_naive();
        match self {
            Self::Today => Window::days(today, today),
            Self::PastWeek => Window::days(days_before(today, 6)?, today),
            Self::PastTwoWeeks => Window::days(days_before(today, 13)?, today),
            Self::Month => {
                let first = days_before(today, u64::from(today.day0()))?;
                let last = first
                    .checked_add_months(Months::new(1))
                    .and_then(|next| next.pred_opt())
                    .ok_or(WindowError::OutOfRange)?;
                Window::days(first, last)
            }
            Self::Year => {
                let first = days_before(today, u64::from(today.ordinal0()))?;
                let last = first
                    .checked_add_months(Months::new(12))
                    .and_then(|next| next.pred_opt())
                    .ok_or(WindowError::OutOfRange)?;
                Window::days(first, last)
            }
        }
    }
}

fn days_before(date: NaiveDate, days: u64) -> Result<NaiveDate, WindowError> {
    date.checked_sub_days(Days::new(days))
        .ok_or(WindowError::OutOfRange)
}
