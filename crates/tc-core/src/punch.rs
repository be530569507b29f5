//! Punches and the per-subject punch log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::{PunchState, state_after};
use crate::types::{PunchId, SubjectId};
use crate::window::Window;

/// A single clock-in or clock-out.
///
/// Whether a punch is an IN or an OUT is not stored: it follows from its
/// position in the subject's ordered log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Punch {
    /// Unique identifier for this punch.
    pub id: PunchId,
    /// The subject who punched.
    pub subject_id: SubjectId,
    /// When the punch happened.
    pub timestamp: DateTime<Utc>,
}

/// A punch paired with the state it moved its subject into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatedPunch {
    #[serde(flatten)]
    pub punch: Punch,
    pub state: PunchState,
}

/// Errors building a [`PunchLog`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LogError {
    /// Two punches share a timestamp, which would make the parity ambiguous.
    #[error("subject {subject_id} has more than one punch at {timestamp}")]
    DuplicateTimestamp {
        subject_id: SubjectId,
        timestamp: DateTime<Utc>,
    },
    /// The punches do not all belong to one subject.
    #[error("punch log for subject {expected} contains a punch for subject {found}")]
    MixedSubjects {
        expected: SubjectId,
        found: SubjectId,
    },
}

/// One subject's punches, strictly ascending by timestamp.
///
/// The log is the only source of a subject's state. An empty log is a valid
/// log for a subject with no history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PunchLog {
    punches: Vec<Punch>,
}

impl PunchLog {
    /// Sorts `punches` and validates them as a single subject's log.
    pub fn new(mut punches: Vec<Punch>) -> Result<Self, LogError> {
        if let Some(first) = punches.first() {
            let expected = first.subject_id;
            if let Some(stray) = punches.iter().find(|p| p.subject_id != expected) {
                return Err(LogError::MixedSubjects {
                    expected,
                    found: stray.subject_id,
                });
            }
        }

        punches.sort_by_key(|p| p.timestamp);
        if let Some(pair) = punches.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
            tracing::warn!(
                subject_id = %pair[0].subject_id,
                timestamp = %pair[0].timestamp,
                "rejecting punch log with duplicate timestamp"
            );
            return Err(LogError::DuplicateTimestamp {
                subject_id: pair[0].subject_id,
                timestamp: pair[0].timestamp,
            });
        }

        Ok(Self { punches })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.punches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.punches.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Punch] {
        &self.punches
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Punch> {
        self.punches.iter()
    }

    /// The most recent punch, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Punch> {
        self.punches.last()
    }

    /// The subject's state after every punch in the log.
    #[must_use]
    pub fn current_state(&self) -> PunchState {
        state_after(self.punches.len())
    }

    /// Number of punches strictly before `instant`.
    #[must_use]
    pub fn count_before(&self, instant: DateTime<Utc>) -> usize {
        self.punches.partition_point(|p| p.timestamp < instant)
    }

    /// The subject's state at `instant`, counting only punches strictly before it.
    ///
    /// A punch exactly at `instant` has not yet taken effect.
    #[must_use]
    pub fn state_at(&self, instant: DateTime<Utc>) -> PunchState {
        state_after(self.count_before(instant))
    }

    /// The punches inside `window`, boundaries included.
    #[must_use]
    pub fn within(&self, window: &Window) -> &[Punch] {
        let first = self.count_before(window.start());
        let last = self.punches.partition_point(|p| p.timestamp <= window.end());
        &self.punches[first..last]
    }

    /// Every punch with the state it produced.
    #[must_use]
    pub fn stated(&self) -> Vec<StatedPunch> {
        stated_from(PunchState::Out, &self.punches)
    }

    /// The punches inside `window` with the state each produced.
    ///
    /// States come from each punch's position in the whole log, so a range
    /// that opens mid-shift starts with an OUT.
    #[must_use]
    pub fn stated_within(&self, window: &Window) -> Vec<StatedPunch> {
        stated_from(self.state_at(window.start()), self.within(window))
    }
}

fn stated_from(mut state: PunchState, punches: &[Punch]) -> Vec<StatedPunch> {
    punches
        .iter()
        .map(|punch| {
            state = state.toggled();
            StatedPunch {
                punch: punch.clone(),
                state,
            }
        })
        .collect()
}

impl<'a> IntoIterator for &'a PunchLog {
    type Item = &'a Punch;
    type IntoIter = std::slice::Iter<'a, Punch>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
