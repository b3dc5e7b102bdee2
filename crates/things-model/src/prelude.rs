//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```
//! use things_model::prelude::*;
//!
//! // Now you have access to:
//! // - Task, TaskKind, TaskStatus, StartBucket (task rows)
//! // - ThingsDate (packed calendar dates)
//! // - RecurrenceRule, RuleOffset, RepeatUpdate (repeat rules)
//! // - ModelError, ModelResult (error handling)
//! ```

// Error types
pub use crate::error::{ModelError, ModelResult};

// Task rows
pub use crate::models::{RepeatTarget, StartBucket, Task, TaskKind, TaskMatch, TaskStatus};

// Dates
pub use crate::models::{datetime_to_timestamp, timestamp_to_datetime, ThingsDate};

// Recurrence
pub use crate::recurrence::{RecurrenceRule, RepeatUpdate, RuleOffset};
