//! Report command for two-week pay period reports.
//!
//! This module implements `tc report` for the current or previous pay period
//! and output formats (human-readable, JSON).

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;
use tc_core::{Clock, PayPeriod, PayPeriodReport, Subject, Timecard, Window};
use tc_db::Database;

use super::util::{format_time, resolve_subject};

/// JSON shape of a report.
#[derive(Debug, Serialize)]
struct ReportJson<'a> {
    subject: &'a Subject,
    weeks: [Window; 2],
    #[serde(flatten)]
    report: &'a PayPeriodReport,
}

pub fn run<W: Write, C: Clock>(
    writer: &mut W,
    db: &Database,
    clock: &C,
    subject: &str,
    period: PayPeriod,
    json: bool,
) -> Result<()> {
    let subject = resolve_subject(db, subject)?;
    let now = clock.now();
    let weeks = period.weeks(now)?;
    let card = Timecard::new(db, clock);
    let report = card.pay_period_report_at(subject.id, period, now)?;

    if json {
        let output = ReportJson {
            subject: &subject,
            weeks,
            report: &report,
        };
        let json = serde_json::to_string_pretty(&output).context("failed to serialize report")?;
        writeln!(writer, "{json}")?;
        return Ok(());
    }

    let label = match period {
        PayPeriod::Current => "Current",
        PayPeriod::Previous => "Previous",
    };
    writeln!(
        writer,
        "{label} pay period for {} ({})",
        subject.username,
        subject.full_name()
    )?;
    let [week1, week2] = weeks;
    for (n, window, regular, overtime) in [
        (1, week1, report.regular_hours_week1, report.overtime_hours_week1),
        (2, week2, report.regular_hours_week2, report.overtime_hours_week2),
    ] {
        writeln!(
            writer,
            "Week {n} ({} to {}): {regular} regular, {overtime} overtime",
            format_time(window.start()),
            format_time(window.end())
        )?;
    }
    if let Some(flag) = &report.flag {
        writeln!(
            writer,
            "Flag: {flag} (expected {:.1}-{:.1} hours/week)",
            subject.bounds.min(),
            subject.bounds.max()
        )?;
    }
    Ok(())
}
