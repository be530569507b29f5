//! Core domain logic for timecapture.
//!
//! This crate contains the fundamental types and logic for:
//! - Punch state: deriving IN/OUT from the parity of a subject's punches
//! - Hours: accumulating worked time inside a closed window
//! - Reports: splitting two weeks into regular and overtime hours
//! - Timecard: the query surface used by storage-backed callers

pub mod clock;
mod hours;
pub mod punch;
pub mod report;
pub mod state;
pub mod timecard;
pub mod types;
pub mod window;

pub use clock::{Clock, FixedClock, SystemClock};
pub use hours::{WorkedDuration, accumulate};
pub use punch::{LogError, Punch, PunchLog, StatedPunch};
pub use report::{OUT_OF_BOUNDS_FLAG, OVERTIME_THRESHOLD, PayPeriod, PayPeriodReport, evaluate};
pub use state::{PunchState, state_after};
pub use timecard::{PunchSource, Timecard, TimecardError};
pub use types::{HoursBounds, NewSubject, PunchId, Subject, SubjectId, ValidationError};
pub use window::{CalendarRange, Window, WindowError};
