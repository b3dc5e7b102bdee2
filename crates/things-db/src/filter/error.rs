//! Error types for the structured filter compiler.

use thiserror::Error;

/// A specialized Result type for filter compilation.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while turning caller-facing filter options into a
/// query plan.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// The status word is not recognised.
    #[error("invalid status {value:?} (use incomplete, completed, canceled or any)")]
    InvalidStatus {
        /// The value as given.
        value: String,
    },

    /// A sort field is not recognised.
    #[error("invalid sort field {field:?}{}", format_suggestion(suggestion.as_deref()))]
    InvalidSortField {
        /// The raw token from the sort spec.
        field: String,
        /// A close spelling of a known field, if any.
        suggestion: Option<String>,
    },

    /// A date bound was given as an empty string.
    #[error("date required")]
    DateRequired,

    /// A date bound could not be parsed.
    #[error("invalid date {input:?} (use YYYY-MM-DD or RFC3339)")]
    InvalidDate {
        /// The value as given.
        input: String,
    },
}

fn format_suggestion(suggestion: Option<&str>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean {s:?}?)"),
        None => String::new(),
    }
}

impl FilterError {
    /// Creates an invalid date error.
    pub fn invalid_date(input: impl Into<String>) -> Self {
        FilterError::InvalidDate {
            input: input.into(),
        }
    }
}
