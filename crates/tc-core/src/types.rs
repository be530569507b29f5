//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Most hours a subject can work in one week.
pub const HOURS_PER_WEEK: f64 = 168.0;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A weekly hour bound was outside [0, 168].
    #[error("{field} must be between 0 and 168 hours, got {value}")]
    HoursOutOfRange { field: &'static str, value: f64 },

    /// The minimum weekly hours exceeded the maximum.
    #[error("minimum weekly hours ({min}) exceeds maximum ({max})")]
    BoundsInverted { min: f64, max: f64 },

    /// Invalid punch state value.
    #[error("invalid punch state: {value}")]
    InvalidPunchState { value: String },
}

/// Generates an integer ID newtype with common trait implementations.
macro_rules! define_int_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw row ID.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw row ID.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

define_int_id!(
    /// Identifies a subject (a worker who punches in and out).
    SubjectId
);

define_int_id!(
    /// Identifies a single punch.
    PunchId
);

/// Weekly hour bounds used to flag a pay period.
///
/// Both ends are inclusive and must lie within \[0, 168\].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBounds")]
pub struct HoursBounds {
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct RawBounds {
    min: f64,
    max: f64,
}

impl TryFrom<RawBounds> for HoursBounds {
    type Error = ValidationError;

    fn try_from(raw: RawBounds) -> Result<Self, Self::Error> {
        Self::new(raw.min, raw.max)
    }
}

impl HoursBounds {
    /// Creates bounds after validation.
    ///
    /// NaN is rejected as out of range.
    pub fn new(min: f64, max: f64) -> Result<Self, ValidationError> {
        check_weekly_hours("minimum weekly hours", min)?;
        check_weekly_hours("maximum weekly hours", max)?;
        if min > max {
            return Err(ValidationError::BoundsInverted { min, max });
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Returns true if `hours` lies within `[min, max]`.
    #[must_use]
    pub fn contains(&self, hours: f64) -> bool {
        (self.min..=self.max).contains(&hours)
    }
}

fn check_weekly_hours(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_nan() || !(0.0..=HOURS_PER_WEEK).contains(&value) {
        return Err(ValidationError::HoursOutOfRange { field, value });
    }
    Ok(())
}

/// A subject ready to be stored, before it has been assigned an ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubject {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub bounds: HoursBounds,
}

impl NewSubject {
    /// Creates a new subject after checking that no name field is blank.
    pub fn new(
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        bounds: HoursBounds,
    ) -> Result<Self, ValidationError> {
        let subject = Self {
            username: username.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            bounds,
        };
        for (field, value) in [
            ("username", &subject.username),
            ("first name", &subject.first_name),
            ("last name", &subject.last_name),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::Empty { field });
            }
        }
        Ok(subject)
    }
}

/// A stored subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub bounds: HoursBounds,
}

impl Subject {
    /// Returns "First Last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
