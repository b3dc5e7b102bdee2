//! Error types for the recurrence engine.

use things_model::ModelError;
use thiserror::Error;

/// A specialized Result type for recurrence operations.
pub type RepeatResult<T> = Result<T, RepeatError>;

/// Errors raised while parsing or building a repeat rule.
#[derive(Debug, Error)]
pub enum RepeatError {
    #[error("invalid repeat mode {0:?}")]
    InvalidMode(String),

    #[error("invalid repeat unit {0:?}")]
    InvalidUnit(String),

    #[error("repeat interval must be >= 1")]
    InvalidInterval,

    #[error("repeat end date must be on or after the start date")]
    EndBeforeStart,

    #[error("repeat deadline offset must be >= 0")]
    NegativeDeadlineOffset,

    /// Date arithmetic left the representable range.
    #[error("repeat date out of range")]
    DateOutOfRange,

    #[error(transparent)]
    Encode(#[from] ModelError),
}
