//! Punch state inferred from event parity.
//!
//! Punches carry no IN/OUT marker. Before any punch a subject is OUT and every
//! punch flips the state, so the state at any instant is decided by how many
//! punches precede it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// Whether a subject is clocked in or out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PunchState {
    In,
    Out,
}

impl PunchState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
        }
    }

    /// The state the next punch moves to.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::In => Self::Out,
            Self::Out => Self::In,
        }
    }
}

impl fmt::Display for PunchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PunchState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" | "in" => Ok(Self::In),
            "OUT" | "out" => Ok(Self::Out),
            _ => Err(ValidationError::InvalidPunchState {
                value: s.to_string(),
            }),
        }
    }
}

/// Returns the state after `event_count` punches: OUT when even, IN when odd.
#[must_use]
pub const fn state_after(event_count: usize) -> PunchState {
    if event_count % 2 == 0 {
        PunchState::Out
    } else {
        PunchState::In
    }
}
