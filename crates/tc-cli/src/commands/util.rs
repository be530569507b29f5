//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use regex::Regex;
use tc_core::{Subject, SubjectId};
use tc_db::{Database, DbError};

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Parse a datetime string as "now", ISO 8601, or relative time.
///
/// Supports:
/// - "now"
/// - ISO 8601: "2026-01-15T10:30:00Z"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_datetime(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("now") {
        return Ok(now);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use ISO 8601 (e.g., 2026-01-15T10:30:00Z) or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::minutes(n * minutes_per_unit))
}

/// Formats a timestamp to the second, e.g. `2026-01-15T10:30:00Z`.
pub fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Resolves a subject from a numeric ID or a username.
///
/// A numeric argument that matches no ID is retried as a username, so
/// all-digit usernames stay reachable.
pub fn resolve_subject(db: &Database, subject: &str) -> anyhow::Result<Subject> {
    if let Ok(id) = subject.parse::<i64>() {
        match db.get_subject(SubjectId::new(id)) {
            Err(DbError::SubjectNotFound(_)) => {}
            found => return Ok(found?),
        }
    }
    Ok(db.find_subject_by_username(subject)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn parses_rfc3339() {
        let parsed = parse_datetime("2026-01-15T10:30:00+02:00", now()).unwrap();
        assert_eq!(format_time(parsed), "2026-01-15T08:30:00Z");
    }

    #[test]
    fn parses_now_and_relative() {
        assert_eq!(parse_datetime("now", now()).unwrap(), now());
        assert_eq!(
            format_time(parse_datetime("90 minutes ago", now()).unwrap()),
            "2026-01-15T10:30:00Z"
        );
        assert_eq!(
            format_time(parse_datetime("1 week ago", now()).unwrap()),
            "2026-01-08T12:00:00Z"
        );
    }

    #[test]
    fn rejects_garbage_and_overflow() {
        assert!(parse_datetime("yesterday-ish", now()).is_err());
        assert!(parse_datetime("999999999 weeks ago", now()).is_err());
    }

    #[test]
    fn resolves_subject_by_id_or_username() {
        let mut db = Database::open_in_memory().unwrap();
        let added = db
            .add_subject(
                &tc_core::NewSubject::new(
                    "ada",
                    "Ada",
                    "Lovelace",
                    tc_core::HoursBounds::new(0.0, 40.0).unwrap(),
                )
                .unwrap(),
            )
            .unwrap();
        assert_eq!(resolve_subject(&db, "1").unwrap(), added);
        assert_eq!(resolve_subject(&db, "ada").unwrap(), added);
        assert!(resolve_subject(&db, "grace").is_err());
    }

    #[test]
    fn numeric_username_falls_back_after_id_miss() {
        let mut db = Database::open_in_memory().unwrap();
        let bounds = tc_core::HoursBounds::new(0.0, 40.0).unwrap();
        let ada = db
            .add_subject(&tc_core::NewSubject::new("ada", "Ada", "Lovelace", bounds).unwrap())
            .unwrap();
        let badge = db
            .add_subject(&tc_core::NewSubject::new("1042", "Grace", "Hopper", bounds).unwrap())
            .unwrap();

        assert_eq!(resolve_subject(&db, "1042").unwrap(), badge);
        // An existing ID still wins over a matching username.
        assert_eq!(resolve_subject(&db, "1").unwrap(), ada);
        let err = resolve_subject(&db, "77").unwrap_err();
        assert_eq!(err.to_string(), "could not find subject with username 77");
    }
}
