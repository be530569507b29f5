//! Worked-hours accumulation over a closed window.
//!
//! # Algorithm Summary
//!
//! 1. Split the log into punches strictly before the window and punches inside
//!    it (both boundaries inclusive)
//! 2. Infer the state at `start` from the count before, and the state at `end`
//!    from the count before plus the count inside
//! 3. If the subject was IN at `start`, the first inside punch closes a shift
//!    that opened before the window, so time runs from `start` to it
//! 4. Remaining punches pair up as IN→OUT shifts
//! 5. If the subject is IN at `end`, the last unpaired IN runs to `end`
//!
//! Each interval contributes whole minutes; the total is reported in hours
//! rounded half-up to one decimal.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::punch::PunchLog;
use crate::state::{PunchState, state_after};
use crate::window::Window;

/// Worked time in hours, held exactly as whole tenths of an hour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkedDuration(u64);

impl WorkedDuration {
    pub const ZERO: Self = Self(0);

    /// Converts whole minutes to tenths of an hour, rounding half-up.
    ///
    /// Six minutes make a tenth, so three minutes is the halfway point.
    #[must_use]
    pub const fn from_minutes(minutes: u64) -> Self {
        Self(minutes.saturating_add(3) / 6)
    }

    #[must_use]
    pub const fn from_tenths(tenths: u64) -> Self {
        Self(tenths)
    }

    #[must_use]
    pub const fn tenths(self) -> u64 {
        self.0
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hours(self) -> f64 {
        self.0 as f64 / 10.0
    }

    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for WorkedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

impl Serialize for WorkedDuration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.hours())
    }
}

/// Whole minutes from `from` to `to`, truncated. Zero if `to` precedes `from`.
fn whole_minutes(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    u64::try_from((to - from).num_minutes()).unwrap_or(0)
}

/// Computes the time a subject spent IN during `window`.
///
/// Never fails: an empty log, or a window with no punches inside, yields
/// either the whole window (IN at both ends) or zero (OUT at both ends).
pub fn accumulate(log: &PunchLog, window: &Window) -> WorkedDuration {
    let before = log.count_before(window.start());
    let inside = log.within(window);
    let start_state = state_after(before);
    let end_state = state_after(before + inside.len());

    let (leading, body) = match (start_state, inside.split_first()) {
        (PunchState::In, Some((first, rest))) => {
            (whole_minutes(window.start(), first.timestamp), rest)
        }
        // One shift spans the whole window.
        (PunchState::In, None) => (whole_minutes(window.start(), window.end()), inside),
        (PunchState::Out, _) => (0, inside),
    };

    let mut pairs = body.chunks_exact(2);
    let paired: u64 = pairs
        .by_ref()
        .map(|shift| whole_minutes(shift[0].timestamp, shift[1].timestamp))
        .sum();

    let trailing = match (end_state, pairs.remainder()) {
        (PunchState::In, [open]) => whole_minutes(open.timestamp, window.end()),
        _ => 0,
    };

    let minutes = leading + paired + trailing;
    let worked = WorkedDuration::from_minutes(minutes);
    tracing::debug!(
        %window,
        before,
        inside = inside.len(),
        %start_state,
        %end_state,
        minutes,
        hours = %worked,
        "accumulated worked time"
    );
    worked
}
