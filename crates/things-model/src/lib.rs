//! Schema types for the Things 3 database.
//!
//! # Quick Start
//!
//! For convenient imports, use the prelude:
//!
//! ```
//! use things_model::prelude::*;
//! ```
//!
//! This re-exports the task record, the packed [`ThingsDate`], the recurrence
//! rule wire format and the error types.

pub mod error;
pub mod models;
pub mod prelude;
pub mod recurrence;

pub use error::{ModelError, ModelResult};
pub use models::{
    datetime_to_timestamp, timestamp_to_datetime, RepeatTarget, StartBucket, Task, TaskKind,
    TaskMatch, TaskStatus, ThingsDate, FAR_FUTURE_YEAR,
};
pub use recurrence::{RecurrenceRule, RepeatUpdate, RuleOffset};
