//! Subject management commands.

use std::io::Write;

use anyhow::{Context, Result};
use tc_core::{HoursBounds, NewSubject, Subject};
use tc_db::Database;

use super::util::resolve_subject;
use crate::{Config, SubjectAction};

/// Runs a subject subcommand.
pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    config: &Config,
    action: &SubjectAction,
) -> Result<()> {
    match action {
        SubjectAction::Add {
            username,
            first_name,
            last_name,
            min,
            max,
        } => {
            let bounds = HoursBounds::new(
                min.unwrap_or(config.default_week_hours_min),
                max.unwrap_or(config.default_week_hours_max),
            )?;
            let subject = NewSubject::new(username, first_name, last_name, bounds)?;
            let added = db.add_subject(&subject)?;
            writeln!(writer, "Added subject #{}: {}", added.id, describe(&added))?;
        }
        SubjectAction::Update {
            subject,
            username,
            first_name,
            last_name,
            min,
            max,
        } => {
            let current = resolve_subject(db, subject)?;
            let bounds = HoursBounds::new(
                min.unwrap_or_else(|| current.bounds.min()),
                max.unwrap_or_else(|| current.bounds.max()),
            )?;
            let changes = NewSubject::new(
                username.as_deref().unwrap_or(&current.username),
                first_name.as_deref().unwrap_or(&current.first_name),
                last_name.as_deref().unwrap_or(&current.last_name),
                bounds,
            )?;
            let updated = db.update_subject(current.id, &changes)?;
            writeln!(writer, "Updated subject #{}: {}", updated.id, describe(&updated))?;
        }
        SubjectAction::List { json } => {
            let subjects = db.list_subjects()?;
            if *json {
                let json = serde_json::to_string_pretty(&subjects)
                    .context("failed to serialize subjects")?;
                writeln!(writer, "{json}")?;
            } else if subjects.is_empty() {
                writeln!(writer, "No subjects yet. Run 'tc subject add' to create one.")?;
            } else {
                writeln!(writer, "{:<4} {:<16} {:<24} WEEKLY HOURS", "ID", "USERNAME", "NAME")?;
                for subject in &subjects {
                    writeln!(
                        writer,
                        "{:<4} {:<16} {:<24} {}",
                        subject.id,
                        subject.username,
                        subject.full_name(),
                        format_bounds(&subject.bounds)
                    )?;
                }
            }
        }
        SubjectAction::Show { subject } => {
            let subject = resolve_subject(db, subject)?;
            writeln!(writer, "ID:           {}", subject.id)?;
            writeln!(writer, "Username:     {}", subject.username)?;
            writeln!(writer, "Name:         {}", subject.full_name())?;
            writeln!(writer, "Weekly hours: {}", format_bounds(&subject.bounds))?;
        }
        SubjectAction::Remove { subject } => {
            let subject = resolve_subject(db, subject)?;
            let removed = db.delete_subject(subject.id)?;
            writeln!(
                writer,
                "Removed subject #{} ({}) and their punches.",
                removed.id, removed.username
            )?;
        }
    }
    Ok(())
}

fn describe(subject: &Subject) -> String {
    format!(
        "{} ({}), {} hours/week",
        subject.username,
        subject.full_name(),
        format_bounds(&subject.bounds)
    )
}

fn format_bounds(bounds: &HoursBounds) -> String {
    format!("{:.1}-{:.1}", bounds.min(), bounds.max())
}
