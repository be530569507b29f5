//! Timecapture CLI library.
//!
//! This crate provides the `tc` command-line interface over the punch clock.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, PunchRange, SubjectAction};
pub use config::Config;
