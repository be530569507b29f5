use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tc_core::{PayPeriod, SystemClock};
use tracing_subscriber::EnvFilter;

use tc_cli::commands::{hours, punch, punches, report, status, subject};
use tc_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(tc_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = tc_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let clock = SystemClock;
    let mut out = std::io::stdout().lock();

    match command {
        Commands::Subject(action) => subject::run(&mut out, &mut db, &config, action)?,
        Commands::Punch { subject, at } => {
            punch::run(&mut out, &mut db, &clock, subject, at.as_deref())?;
        }
        Commands::Move {
            punch: id,
            at,
            subject,
        } => punch::move_punch(&mut out, &mut db, &clock, *id, at, subject.as_deref())?,
        Commands::Unpunch { punch: id } => punch::unpunch(&mut out, &mut db, *id)?,
        Commands::Status { subject } => status::run(&mut out, &db, &clock, subject)?,
        Commands::Punches {
            subject,
            range,
            json,
        } => punches::run(&mut out, &db, &clock, subject, *range, *json)?,
        Commands::Hours {
            subject,
            start,
            end,
        } => hours::run(&mut out, &db, &clock, subject, start, end.as_deref())?,
        Commands::Report {
            subject,
            previous,
            json,
        } => {
            let period = if *previous {
                PayPeriod::Previous
            } else {
                PayPeriod::Current
            };
            report::run(&mut out, &db, &clock, subject, period, *json)?;
        }
    }

    out.flush()?;
    Ok(())
}
