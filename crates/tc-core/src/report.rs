//! Pay period reports.
//!
//! A pay period is two adjacent weeks. Each week's hours are split into
//! regular and overtime at [`OVERTIME_THRESHOLD`], and the report is flagged
//! when either week falls outside the subject's weekly bounds.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::hours::WorkedDuration;
use crate::types::HoursBounds;
use crate::window::{Window, WindowError};

/// Weekly hours beyond which time counts as overtime.
pub const OVERTIME_THRESHOLD: WorkedDuration = WorkedDuration::from_tenths(400);

/// Flag raised when a week's hours fall outside the subject's bounds.
pub const OUT_OF_BOUNDS_FLAG: &str = "Hours out of bounds";

/// Regular and overtime hours for a two-week pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayPeriodReport {
    pub regular_hours_week1: WorkedDuration,
    pub overtime_hours_week1: WorkedDuration,
    pub regular_hours_week2: WorkedDuration,
    pub overtime_hours_week2: WorkedDuration,
    /// Set when either week is outside the bounds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
}

/// Splits a week's total into `(regular, overtime)`.
fn split_overtime(total: WorkedDuration) -> (WorkedDuration, WorkedDuration) {
    let regular = total.min(OVERTIME_THRESHOLD);
    (regular, total.saturating_sub(regular))
}

/// Builds a report from two consecutive weekly totals.
pub fn evaluate(durations: [WorkedDuration; 2], bounds: &HoursBounds) -> PayPeriodReport {
    let [week1, week2] = durations;
    let (regular_hours_week1, overtime_hours_week1) = split_overtime(week1);
    let (regular_hours_week2, overtime_hours_week2) = split_overtime(week2);

    let out_of_bounds = durations.iter().any(|d| !bounds.contains(d.hours()));
    if out_of_bounds {
        tracing::debug!(
            week1 = %week1,
            week2 = %week2,
            min = bounds.min(),
            max = bounds.max(),
            "pay period hours out of bounds"
        );
    }

    PayPeriodReport {
        regular_hours_week1,
        overtime_hours_week1,
        regular_hours_week2,
        overtime_hours_week2,
        flag: out_of_bounds.then(|| OUT_OF_BOUNDS_FLAG.to_string()),
    }
}

/// Which pay period to report on, relative to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayPeriod {
    /// The two weeks ending now.
    #[default]
    Current,
    /// The two weeks before the current period.
    Previous,
}

impl PayPeriod {
    /// The two week-long windows making up the period, oldest first.
    ///
    /// Adjacent weeks share their boundary instant.
    pub fn weeks(self, now: DateTime<Utc>) -> Result<[Window; 2], WindowError> {
        let offset = match self {
            Self::Current => 0,
            Self::Previous => 2,
        };
        let week_end = |weeks_back: i64| {
            now.checked_sub_signed(Duration::weeks(weeks_back))
                .ok_or(WindowError::OutOfRange)
        };
        let week2_end = week_end(offset)?;
        let week1_end = week_end(offset + 1)?;
        Ok([
            Window::ending_at(week1_end, Duration::weeks(1))?,
            Window::ending_at(week2_end, Duration::weeks(1))?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::punch::fixtures::at;
    use insta::assert_snapshot;

    fn hours(tenths: u64) -> WorkedDuration {
        WorkedDuration::from_tenths(tenths)
    }

    #[test]
    fn splits_overtime_at_forty_hours() {
        let bounds = HoursBounds::new(35.0, 45.0).unwrap();
        let report = evaluate([hours(450), hours(380)], &bounds);
        assert_eq!(report.regular_hours_week1, hours(400));
        assert_eq!(report.overtime_hours_week1, hours(50));
        assert_eq!(report.regular_hours_week2, hours(380));
        assert_eq!(report.overtime_hours_week2, WorkedDuration::ZERO);
    }

    #[test]
    fn bounds_are_inclusive() {
        let bounds = HoursBounds::new(35.0, 45.0).unwrap();
        let report = evaluate([hours(450), hours(380)], &bounds);
        assert_eq!(report.flag, None);
    }

    #[test]
    fn flags_week_above_max() {
        let bounds = HoursBounds::new(35.0, 44.0).unwrap();
        let report = evaluate([hours(450), hours(380)], &bounds);
        assert_eq!(report.flag.as_deref(), Some(OUT_OF_BOUNDS_FLAG));
    }

    #[test]
    fn flags_second_week_below_min() {
        let bounds = HoursBounds::new(35.0, 45.0).unwrap();
        let report = evaluate([hours(400), hours(349)], &bounds);
        assert_eq!(report.flag.as_deref(), Some(OUT_OF_BOUNDS_FLAG));
    }

    #[test]
    fn exactly_forty_hours_has_no_overtime() {
        let bounds = HoursBounds::new(0.0, 168.0).unwrap();
        let report = evaluate([hours(400), WorkedDuration::ZERO], &bounds);
        assert_eq!(report.regular_hours_week1, hours(400));
        assert_eq!(report.overtime_hours_week1, WorkedDuration::ZERO);
    }

    #[test]
    fn report_serializes_hours_and_flag() {
        let bounds = HoursBounds::new(35.0, 44.0).unwrap();
        let report = evaluate([hours(450), hours(380)], &bounds);
        assert_snapshot!(
            serde_json::to_string(&report).unwrap(),
            @r#"{"regular_hours_week1":40.0,"overtime_hours_week1":5.0,"regular_hours_week2":38.0,"overtime_hours_week2":0.0,"flag":"Hours out of bounds"}"#
        );
    }

    #[test]
    fn current_period_is_the_two_weeks_ending_now() {
        let now = at("2025-03-17T12:00:00Z");
        let [week1, week2] = PayPeriod::Current.weeks(now).unwrap();
        assert_eq!(week1.start(), at("2025-03-03T12:00:00Z"));
        assert_eq!(week1.end(), at("2025-03-10T12:00:00Z"));
        assert_eq!(week2.start(), at("2025-03-10T12:00:00Z"));
        assert_eq!(week2.end(), now);
    }

    #[test]
    fn previous_period_precedes_current() {
        let now = at("2025-03-17T12:00:00Z");
        let [week1, week2] = PayPeriod::Previous.weeks(now).unwrap();
        assert_eq!(week1.start(), at("2025-02-17T12:00:00Z"));
        assert_eq!(week1.end(), at("2025-02-24T12:00:00Z"));
        assert_eq!(week2.start(), at("2025-02-24T12:00:00Z"));
        assert_eq!(week2.end(), at("2025-03-03T12:00:00Z"));
    }
}
