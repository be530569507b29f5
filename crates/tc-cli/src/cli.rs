//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Punch clock for tracking worked hours.
///
/// Subjects punch in and out; whether a punch is an IN or an OUT follows from
/// the order of their punches.
#[derive(Debug, Parser)]
#[command(name = "tc", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage subjects.
    #[command(subcommand)]
    Subject(SubjectAction),

    /// Record a punch, toggling the subject between IN and OUT.
    Punch {
        /// Subject ID or username.
        subject: String,

        /// When the punch happened (ISO 8601 or e.g. "15 minutes ago"). Defaults to now.
        #[arg(long)]
        at: Option<String>,
    },

    /// Move a punch to a new time, or reassign it to another subject.
    Move {
        /// The punch ID.
        punch: i64,

        /// The corrected time (ISO 8601 or e.g. "15 minutes ago").
        #[arg(long)]
        at: String,

        /// Reassign the punch to this subject ID or username.
        #[arg(long)]
        subject: Option<String>,
    },

    /// Delete a punch by ID.
    Unpunch {
        /// The punch ID.
        punch: i64,
    },

    /// Show whether a subject is currently IN or OUT.
    Status {
        /// Subject ID or username.
        subject: String,
    },

    /// List a subject's punches.
    Punches {
        /// Subject ID or username.
        subject: String,

        /// Which punches to list.
        #[arg(long, value_enum, default_value_t = PunchRange::All)]
        range: PunchRange,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show hours worked between two instants (both inclusive).
    Hours {
        /// Subject ID or username.
        subject: String,

        /// Window start (ISO 8601 or relative).
        #[arg(long)]
        start: String,

        /// Window end (ISO 8601 or relative). Defaults to now.
        #[arg(long)]
        end: Option<String>,
    },

    /// Show the two-week pay period report.
    Report {
        /// Subject ID or username.
        subject: String,

        /// Report on the pay period before the current one.
        #[arg(long)]
        previous: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Subject management actions.
#[derive(Debug, Subcommand)]
pub enum SubjectAction {
    /// Add a subject.
    Add {
        /// Unique username.
        username: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        /// Minimum expected weekly hours. Defaults to the configured value.
        #[arg(long)]
        min: Option<f64>,

        /// Maximum expected weekly hours. Defaults to the configured value.
        #[arg(long)]
        max: Option<f64>,
    },

    /// Change a subject's profile. Omitted fields keep their value.
    Update {
        /// Subject ID or username.
        subject: String,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        min: Option<f64>,

        #[arg(long)]
        max: Option<f64>,
    },

    /// List all subjects.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show one subject.
    Show {
        /// Subject ID or username.
        subject: String,
    },

    /// Remove a subject and all of their punches.
    Remove {
        /// Subject ID or username.
        subject: String,
    },
}

/// Punch listing ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PunchRange {
    Today,
    Week,
    TwoWeeks,
    Month,
    Year,
    All,
}
