//! CLI subcommand implementations.

pub mod hours;
pub mod punch;
pub mod punches;
pub mod report;
pub mod status;
pub mod subject;
mod util;
