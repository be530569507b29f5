//! Timecard queries over a punch source.
//!
//! [`Timecard`] is the surface storage-backed callers use: it reads a
//! subject's punches from a [`PunchSource`], validates them as a
//! [`PunchLog`], and runs the pure state and hours logic over that snapshot.
//! Nothing is cached; every query recomputes from the source.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::clock::Clock;
use crate::hours::{WorkedDuration, accumulate};
use crate::punch::{LogError, Punch, PunchLog, StatedPunch};
use crate::report::{PayPeriod, PayPeriodReport, evaluate};
use crate::state::PunchState;
use crate::types::{Subject, SubjectId};
use crate::window::{CalendarRange, Window, WindowError};

/// Read access to subjects and their punches.
///
/// Implementations must return one consistent snapshot per call.
pub trait PunchSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Looks up a subject, failing if it does not exist.
    fn subject(&self, id: SubjectId) -> Result<Subject, Self::Error>;

    /// All punches for a subject, in any order.
    fn punches(&self, id: SubjectId) -> Result<Vec<Punch>, Self::Error>;
}

impl<T: PunchSource + ?Sized> PunchSource for &T {
    type Error = T::Error;

    fn subject(&self, id: SubjectId) -> Result<Subject, Self::Error> {
        (**self).subject(id)
    }

    fn punches(&self, id: SubjectId) -> Result<Vec<Punch>, Self::Error> {
        (**self).punches(id)
    }
}

/// Errors from timecard queries.
#[derive(Debug, Error)]
pub enum TimecardError<E> {
    /// The punch source failed.
    #[error(transparent)]
    Source(E),
    /// The subject's punches do not form a valid log.
    #[error(transparent)]
    Log(#[from] LogError),
    /// A requested window could not be built.
    #[error(transparent)]
    Window(#[from] WindowError),
}

/// Timecard queries for subjects in a [`PunchSource`].
#[derive(Debug, Clone)]
pub struct Timecard<S, C> {
    source: S,
    clock: C,
}

impl<S: PunchSource, C: Clock> Timecard<S, C> {
    pub const fn new(source: S, clock: C) -> Self {
        Self { source, clock }
    }

    /// The subject's full history. Empty if they have never punched.
    pub fn history(&self, subject: SubjectId) -> Result<PunchLog, TimecardError<S::Error>> {
        let punches = self.source.punches(subject).map_err(TimecardError::Source)?;
        Ok(PunchLog::new(punches)?)
    }

    /// Whether the subject is currently clocked in.
    pub fn current_state(&self, subject: SubjectId) -> Result<PunchState, TimecardError<S::Error>> {
        Ok(self.history(subject)?.current_state())
    }

    /// The subject's most recent punch.
    pub fn last_punch(&self, subject: SubjectId) -> Result<Option<Punch>, TimecardError<S::Error>> {
        Ok(self.history(subject)?.last().cloned())
    }

    /// Punches inside `window`, oldest first, each with the state it produced.
    pub fn punches_in(
        &self,
        subject: SubjectId,
        window: &Window,
    ) -> Result<Vec<StatedPunch>, TimecardError<S::Error>> {
        Ok(self.history(subject)?.stated_within(window))
    }

    /// Punches inside a calendar range around the clock's "now".
    pub fn calendar_punches(
        &self,
        subject: SubjectId,
        range: CalendarRange,
    ) -> Result<Vec<StatedPunch>, TimecardError<S::Error>> {
        let window = range.window(self.clock.now())?;
        self.punches_in(subject, &window)
    }

    /// Hours worked inside `window`.
    pub fn hours(
        &self,
        subject: SubjectId,
        window: &Window,
    ) -> Result<WorkedDuration, TimecardError<S::Error>> {
        Ok(accumulate(&self.history(subject)?, window))
    }

    /// Regular and overtime hours for a pay period, flagged against the
    /// subject's weekly bounds.
    pub fn pay_period_report(
        &self,
        subject: SubjectId,
        period: PayPeriod,
    ) -> Result<PayPeriodReport, TimecardError<S::Error>> {
        self.pay_period_report_at(subject, period, self.clock.now())
    }

    /// [`Self::pay_period_report`] for the period as seen at `now`.
    ///
    /// Callers that also display [`PayPeriod::weeks`] pass the same `now`
    /// so the printed weeks are the ones summed.
    pub fn pay_period_report_at(
        &self,
        subject: SubjectId,
        period: PayPeriod,
        now: DateTime<Utc>,
    ) -> Result<PayPeriodReport, TimecardError<S::Error>> {
        let profile = self.source.subject(subject).map_err(TimecardError::Source)?;
        let log = self.history(subject)?;
        let [week1, week2] = period.weeks(now)?;
        let durations = [accumulate(&log, &week1), accumulate(&log, &week2)];
        Ok(evaluate(durations, &profile.bounds))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::clock::FixedClock;
    use crate::punch::fixtures::at;
    use crate::types::{HoursBounds, PunchId};

    #[derive(Debug, thiserror::Error)]
    #[error("no subject {0}")]
    struct Missing(SubjectId);

    #[derive(Default)]
    struct MemorySource {
        subjects: HashMap<SubjectId, Subject>,
        punches: Vec<Punch>,
    }

    impl MemorySource {
        fn with_subject(min: f64, max: f64) -> Self {
            let id = SubjectId::new(1);
            let subject = Subject {
                id,
                username: "ada".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                bounds: HoursBounds::new(min, max).unwrap(),
            };
            Self {
                subjects: HashMap::from([(id, subject)]),
                punches: Vec::new(),
            }
        }

        fn punch(mut self, ts: &str) -> Self {
            let id = PunchId::new(i64::try_from(self.punches.len()).unwrap() + 1);
            self.punches.push(Punch {
                id,
                subject_id: SubjectId::new(1),
                timestamp: at(ts),
            });
            self
        }
    }

    impl PunchSource for MemorySource {
        type Error = Missing;

        fn subject(&self, id: SubjectId) -> Result<Subject, Missing> {
            self.subjects.get(&id).cloned().ok_or(Missing(id))
        }

        fn punches(&self, id: SubjectId) -> Result<Vec<Punch>, Missing> {
            self.subject(id)?;
            Ok(self
                .punches
                .iter()
                .filter(|p| p.subject_id == id)
                .cloned()
                .collect())
        }
    }

    fn timecard(source: MemorySource, now: &str) -> Timecard<MemorySource, FixedClock> {
        Timecard::new(source, FixedClock(at(now)))
    }

    #[test]
    fn current_state_of_empty_history_is_out() {
        let card = timecard(MemorySource::with_subject(0.0, 40.0), "2025-03-10T12:00:00Z");
        assert_eq!(card.current_state(SubjectId::new(1)).unwrap(), PunchState::Out);
        assert!(card.last_punch(SubjectId::new(1)).unwrap().is_none());
    }

    #[test]
    fn current_state_uses_total_punch_count() {
        let source = MemorySource::with_subject(0.0, 40.0)
            .punch("2025-03-10T09:00:00Z")
            .punch("2025-03-10T12:00:00Z")
            .punch("2025-03-10T13:00:00Z");
        let card = timecard(source, "2025-03-10T14:00:00Z");
        assert_eq!(card.current_state(SubjectId::new(1)).unwrap(), PunchState::In);
        let last = card.last_punch(SubjectId::new(1)).unwrap().unwrap();
        assert_eq!(last.timestamp, at("2025-03-10T13:00:00Z"));
    }

    #[test]
    fn unknown_subject_surfaces_source_error() {
        let card = timecard(MemorySource::default(), "2025-03-10T12:00:00Z");
        let err = card.current_state(SubjectId::new(9)).unwrap_err();
        assert!(matches!(err, TimecardError::Source(Missing(_))));
        assert_eq!(err.to_string(), "no subject 9");
    }

    #[test]
    fn duplicate_timestamps_are_reported() {
        let source = MemorySource::with_subject(0.0, 40.0)
            .punch("2025-03-10T09:00:00Z")
            .punch("2025-03-10T09:00:00Z");
        let card = timecard(source, "2025-03-10T12:00:00Z");
        let err = card.hours(
            SubjectId::new(1),
            &Window::new(at("2025-03-10T00:00:00Z"), at("2025-03-10T23:00:00Z")).unwrap(),
        );
        assert!(matches!(
            err,
            Err(TimecardError::Log(LogError::DuplicateTimestamp { .. }))
        ));
    }

    #[test]
    fn calendar_punches_uses_clock() {
        let source = MemorySource::with_subject(0.0, 40.0)
            .punch("2025-03-09T09:00:00Z")
            .punch("2025-03-09T17:00:00Z")
            .punch("2025-03-10T09:00:00Z");
        let card = timecard(source, "2025-03-10T12:00:00Z");
        let today = card
            .calendar_punches(SubjectId::new(1), CalendarRange::Today)
            .unwrap();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].punch.timestamp, at("2025-03-10T09:00:00Z"));
        assert_eq!(today[0].state, PunchState::In);
        let week = card
            .calendar_punches(SubjectId::new(1), CalendarRange::PastWeek)
            .unwrap();
        assert_eq!(week.len(), 3);
    }

    #[test]
    fn pay_period_report_uses_subject_bounds() {
        // Week 1: 2025-03-03 12:00 .. 2025-03-10 12:00, one 45h stint.
        // Week 2: 2025-03-10 12:00 .. 2025-03-17 12:00, one 38h stint.
        let source = MemorySource::with_subject(35.0, 44.0)
            .punch("2025-03-04T00:00:00Z")
            .punch("2025-03-05T21:00:00Z")
            .punch("2025-03-11T00:00:00Z")
            .punch("2025-03-12T14:00:00Z");
        let card = timecard(source, "2025-03-17T12:00:00Z");
        let report = card
            .pay_period_report(SubjectId::new(1), PayPeriod::Current)
            .unwrap();
        assert_eq!(report.regular_hours_week1.to_string(), "40.0");
        assert_eq!(report.overtime_hours_week1.to_string(), "5.0");
        assert_eq!(report.regular_hours_week2.to_string(), "38.0");
        assert_eq!(report.overtime_hours_week2, WorkedDuration::ZERO);
        assert!(report.flag.is_some());
    }

    #[test]
    fn punches_in_carries_state_from_before_window() {
        let source = MemorySource::with_subject(0.0, 40.0)
            .punch("2025-03-10T09:00:00Z")
            .punch("2025-03-10T12:00:00Z")
            .punch("2025-03-10T13:00:00Z");
        let card = timecard(source, "2025-03-10T14:00:00Z");
        let window = Window::new(at("2025-03-10T10:00:00Z"), at("2025-03-10T14:00:00Z")).unwrap();
        let states: Vec<PunchState> = card
            .punches_in(SubjectId::new(1), &window)
            .unwrap()
            .into_iter()
            .map(|p| p.state)
            .collect();
        assert_eq!(states, vec![PunchState::Out, PunchState::In]);
    }

    #[test]
    fn pay_period_report_at_ignores_clock() {
        let source = MemorySource::with_subject(0.0, 40.0)
            .punch("2025-03-11T09:00:00Z")
            .punch("2025-03-11T17:00:00Z");
        let card = timecard(source, "2030-01-01T00:00:00Z");
        let report = card
            .pay_period_report_at(SubjectId::new(1), PayPeriod::Current, at("2025-03-17T12:00:00Z"))
            .unwrap();
        assert_eq!(report.regular_hours_week2.to_string(), "8.0");
        let later = card
            .pay_period_report(SubjectId::new(1), PayPeriod::Current)
            .unwrap();
        assert_eq!(later.regular_hours_week2, WorkedDuration::ZERO);
    }

    #[test]
    fn previous_pay_period_ignores_recent_punches() {
        let source = MemorySource::with_subject(0.0, 40.0)
            .punch("2025-03-11T09:00:00Z")
            .punch("2025-03-11T17:00:00Z");
        let card = timecard(source, "2025-03-17T12:00:00Z");
        let report = card
            .pay_period_report(SubjectId::new(1), PayPeriod::Previous)
            .unwrap();
        assert_eq!(report.regular_hours_week1, WorkedDuration::ZERO);
        assert_eq!(report.regular_hours_week2, WorkedDuration::ZERO);
        assert_eq!(report.flag, None);
    }
}
