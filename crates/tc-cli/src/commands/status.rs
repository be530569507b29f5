//! Status command for showing whether a subject is clocked in.

use std::io::Write;

use anyhow::Result;
use tc_core::{Clock, Timecard};
use tc_db::Database;

use super::util::{format_time, resolve_subject};

pub fn run<W: Write, C: Clock>(
    writer: &mut W,
    db: &Database,
    clock: &C,
    subject: &str,
) -> Result<()> {
    let subject = resolve_subject(db, subject)?;
    let card = Timecard::new(db, clock);
    let log = card.history(subject.id)?;

    writeln!(
        writer,
        "{} ({}): {}",
        subject.username,
        subject.full_name(),
        log.current_state()
    )?;

    match log.last() {
        Some(last) => writeln!(
            writer,
            "Last punch: #{} at {} ({} total)",
            last.id,
            format_time(last.timestamp),
            log.len()
        )?,
        None => writeln!(writer, "No punches recorded.")?,
    }

    Ok(())
}
