//! Hours command for worked time inside an arbitrary window.

use std::io::Write;

use anyhow::{Context, Result};
use tc_core::{Clock, Timecard, Window};
use tc_db::Database;

use super::util::{format_time, parse_datetime, resolve_subject};

pub fn run<W: Write, C: Clock>(
    writer: &mut W,
    db: &Database,
    clock: &C,
    subject: &str,
    start: &str,
    end: Option<&str>,
) -> Result<()> {
    let subject = resolve_subject(db, subject)?;
    let now = clock.now();
    let start = parse_datetime(start, now).context("invalid --start")?;
    let end = match end {
        Some(end) => parse_datetime(end, now).context("invalid --end")?,
        None => now,
    };
    let window = Window::new(start, end)?;

    let card = Timecard::new(db, clock);
    let worked = card.hours(subject.id, &window)?;

    writeln!(
        writer,
        "{} worked {} hours from {} to {}",
        subject.username,
        worked,
        format_time(window.start()),
        format_time(window.end())
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, Utc};
    use insta::assert_snapshot;
    use tc_core::{FixedClock, HoursBounds, NewSubject, SubjectId};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn setup(punches: &[&str]) -> Database {
        let mut db = Database::open_in_memory().unwrap();
        db.add_subject(
            &NewSubject::new("ada", "Ada", "Lovelace", HoursBounds::new(0.0, 40.0).unwrap())
                .unwrap(),
        )
        .unwrap();
        for ts in punches {
            db.add_punch(SubjectId::new(1), at(ts)).unwrap();
        }
        db
    }

    fn hours(db: &Database, start: &str, end: Option<&str>) -> Result<String> {
        let clock = FixedClock(at("2025-03-10T20:00:00Z"));
        let mut output = Vec::new();
        run(&mut output, db, &clock, "ada", start, end)?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[test]
    fn sums_shifts_inside_window() {
        let db = setup(&[
            "2025-03-10T09:00:00Z",
            "2025-03-10T12:00:00Z",
            "2025-03-10T13:00:00Z",
            "2025-03-10T17:00:00Z",
        ]);
        let output = hours(&db, "2025-03-10T08:00:00Z", Some("2025-03-10T18:00:00Z")).unwrap();
        assert_snapshot!(output, @"ada worked 7.0 hours from 2025-03-10T08:00:00Z to 2025-03-10T18:00:00Z");
    }

    #[test]
    fn open_shift_runs_to_now() {
        let db = setup(&["2025-03-10T09:00:00Z"]);
        let output = hours(&db, "12 hours ago", None).unwrap();
        assert_snapshot!(output, @"ada worked 11.0 hours from 2025-03-10T08:00:00Z to 2025-03-10T20:00:00Z");
    }

    #[test]
    fn inverted_window_is_rejected() {
        let db = setup(&[]);
        let err = hours(&db, "2025-03-10T18:00:00Z", Some("2025-03-10T08:00:00Z")).unwrap_err();
        assert!(err.to_string().starts_with("window start"));
    }
}
