//! Punches command for listing a subject's punches with their inferred state.

use std::io::Write;

use anyhow::{Context, Result};
use tc_core::{CalendarRange, Clock, Timecard};
use tc_db::Database;

use super::util::{format_time, resolve_subject};
use crate::PunchRange;

const fn calendar_range(range: PunchRange) -> Option<CalendarRange> {
    match range {
        PunchRange::Today => Some(CalendarRange::Today),
        PunchRange::Week => Some(CalendarRange::PastWeek),
        PunchRange::TwoWeeks => Some(CalendarRange::PastTwoWeeks),
        PunchRange::Month => Some(CalendarRange::Month),
        PunchRange::Year => Some(CalendarRange::Year),
        PunchRange::All => None,
    }
}

pub fn run<W: Write, C: Clock>(
    writer: &mut W,
    db: &Database,
    clock: &C,
    subject: &str,
    range: PunchRange,
    json: bool,
) -> Result<()> {
    let subject = resolve_subject(db, subject)?;
    let card = Timecard::new(db, clock);
    let lines = match calendar_range(range) {
        Some(range) => card.calendar_punches(subject.id, range)?,
        None => card.history(subject.id)?.stated(),
    };

    if json {
        let json = serde_json::to_string_pretty(&lines).context("failed to serialize punches")?;
        writeln!(writer, "{json}")?;
        return Ok(());
    }

    if lines.is_empty() {
        writeln!(writer, "No punches for {} in range.", subject.username)?;
        return Ok(());
    }

    for line in &lines {
        writeln!(
            writer,
            "#{:<5} {}  {}",
            line.punch.id,
            format_time(line.punch.timestamp),
            line.state
        )?;
    }
    Ok(())
}
