//! Error types for the engine and the SQLite store.

use std::path::PathBuf;

use thiserror::Error;

use crate::filter::FilterError;
use crate::query::QueryError;
use crate::repeat::RepeatError;
use crate::repository::ReferenceKind;
use crate::wait::WaitError;

/// A specialized Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by a [`crate::TaskRepository`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite reported an error.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// No database path was configured or discovered.
    #[error("empty database path")]
    MissingPath,

    /// The database file does not exist.
    #[error("database not found at '{}'", path.display())]
    DatabaseNotFound {
        /// The path that was tried.
        path: PathBuf,
    },

    /// A project, area or tag reference did not resolve.
    #[error("{}", format_not_found(*kind, input, suggestion.as_deref()))]
    NotFound {
        kind: ReferenceKind,
        /// The identifier or title as given.
        input: String,
        /// A similarly named item, if any.
        suggestion: Option<String>,
    },

    /// No task has the given identifier.
    #[error("task not found: {id}")]
    TaskNotFound { id: String },

    /// An identifier argument was empty.
    #[error("task id required")]
    IdRequired,

    /// A title lookup was given an empty title.
    #[error("title required")]
    TitleRequired,

    /// A repeat update without an encoded rule.
    #[error("recurrence rule required")]
    RuleRequired,

    /// The task cannot carry a repeat rule.
    #[error("{reason}")]
    InvalidRepeatTarget {
        /// The resolved identifier.
        id: String,
        reason: &'static str,
    },
}

fn format_not_found(kind: ReferenceKind, input: &str, suggestion: Option<&str>) -> String {
    let base = format!("{} not found: {}", kind.label(), input);
    match suggestion {
        Some(s) => format!("{base} (did you mean '{s}'?)"),
        None => base,
    }
}

impl StoreError {
    /// Creates a not-found error without a suggestion.
    pub fn not_found(kind: ReferenceKind, input: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind,
            input: input.into(),
            suggestion: None,
        }
    }
}

/// Any error the engine can return.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Repeat(#[from] RepeatError),

    #[error(transparent)]
    Wait(#[from] WaitError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
