//! Punch, move and unpunch commands.

use std::io::Write;

use anyhow::Result;
use tc_core::{Clock, PunchId, Timecard};
use tc_db::Database;

use super::util::{format_time, parse_datetime, resolve_subject};

/// Records a punch for a subject and reports the state it leaves them in.
pub fn run<W: Write, C: Clock>(
    writer: &mut W,
    db: &mut Database,
    clock: &C,
    subject: &str,
    at: Option<&str>,
) -> Result<()> {
    let subject = resolve_subject(db, subject)?;
    let timestamp = match at {
        Some(at) => parse_datetime(at, clock.now())?,
        None => clock.now(),
    };

    let punch = db.add_punch(subject.id, timestamp)?;
    let card = Timecard::new(&*db, clock);
    let state = card.current_state(subject.id)?;

    writeln!(
        writer,
        "Recorded punch #{} for {} at {}; now {}",
        punch.id,
        subject.username,
        format_time(punch.timestamp),
        state
    )?;
    Ok(())
}

/// Moves a punch to a new time, optionally under another subject.
///
/// Fails without changes if the target subject already has a punch at that
/// time.
pub fn move_punch<W: Write, C: Clock>(
    writer: &mut W,
    db: &mut Database,
    clock: &C,
    punch: i64,
    at: &str,
    subject: Option<&str>,
) -> Result<()> {
    let current = db.get_punch(PunchId::new(punch))?;
    let subject = match subject {
        Some(subject) => resolve_subject(db, subject)?,
        None => db.get_subject(current.subject_id)?,
    };
    let timestamp = parse_datetime(at, clock.now())?;

    let moved = db.update_punch(current.id, subject.id, timestamp)?;
    writeln!(
        writer,
        "Moved punch #{} for {} from {} to {}",
        moved.id,
        subject.username,
        format_time(current.timestamp),
        format_time(moved.timestamp)
    )?;
    Ok(())
}

/// Deletes a punch.
pub fn unpunch<W: Write>(writer: &mut W, db: &mut Database, punch: i64) -> Result<()> {
    let removed = db.delete_punch(PunchId::new(punch))?;
    let subject = db.get_subject(removed.subject_id)?;
    writeln!(
        writer,
        "Deleted punch #{} for {} at {}",
        removed.id,
        subject.username,
        format_time(removed.timestamp)
    )?;
    Ok(())
}
