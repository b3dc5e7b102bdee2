//! Error types for the Things schema types.

use thiserror::Error;

/// A specialized Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while converting between Rust values and the
/// representations stored in the Things database.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A packed calendar date does not decode to a real date.
    #[error("invalid packed date: {raw}")]
    InvalidDate {
        /// The raw column value.
        raw: i64,
    },

    /// The recurrence rule could not be written as a property list.
    #[error("failed to encode recurrence rule: {0}")]
    RuleEncode(#[source] plist::Error),

    /// A stored recurrence rule blob could not be read back.
    #[error("failed to decode recurrence rule: {0}")]
    RuleDecode(#[source] plist::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_date_display() {
        let err = ModelError::InvalidDate { raw: 42 };
        assert_eq!(err.to_string(), "invalid packed date: 42");
    }

    #[test]
    fn test_model_error_implements_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ModelError::InvalidDate { raw: 0 });
        assert!(err.to_string().contains("packed date"));
    }
}
