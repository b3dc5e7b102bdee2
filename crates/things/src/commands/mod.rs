//! Command implementations for the things CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod completions;
pub mod config;
pub mod repeat;
pub mod todos;

use std::env;
use std::path::PathBuf;

use things_db::{FilterError, QueryError, RepeatError, SqliteStore, StoreError, WaitError};

use crate::cli::{Cli, OutputFormat};
use config::Config;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Database or reference resolution error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Filter option error (status, sort, dates).
    #[error("filter error: {0}")]
    Filter(#[from] FilterError),

    /// Rich query parse error.
    #[error("query error: {0}")]
    Query(#[from] QueryError),

    /// Invalid repeat schedule.
    #[error("repeat error: {0}")]
    Repeat(#[from] RepeatError),

    /// Waiting for a created item failed.
    #[error("{0}")]
    Wait(WaitError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<WaitError> for CommandError {
    fn from(err: WaitError) -> Self {
        match err {
            WaitError::Store(e) => CommandError::Store(e),
            other => CommandError::Wait(other),
        }
    }
}

impl From<things_db::Error> for CommandError {
    fn from(err: things_db::Error) -> Self {
        match err {
            things_db::Error::Store(e) => e.into(),
            things_db::Error::Filter(e) => e.into(),
            things_db::Error::Query(e) => e.into(),
            things_db::Error::Repeat(e) => e.into(),
            things_db::Error::Wait(e) => e.into(),
        }
    }
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Whether to be verbose.
    pub verbose: bool,
    /// Database path from `--db` or `THINGSDB`.
    pub db: Option<PathBuf>,
    /// Database path from the config file.
    pub configured_db: Option<PathBuf>,
    /// Listing format from the config file.
    pub default_format: Option<OutputFormat>,
    /// Listing limit from the config file.
    pub default_limit: Option<usize>,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments and the loaded config.
    ///
    /// Colors are off when `--no-color` is given, `NO_COLOR` is set, or the
    /// config disables them.
    pub fn new(cli: &Cli, config: &Config) -> Self {
        let no_color_env = env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color && !no_color_env && config.output.color != Some(false),
            quiet: cli.quiet,
            verbose: cli.verbose,
            db: cli.db.clone(),
            configured_db: config.database.clone(),
            default_format: config.output_format(),
            default_limit: config.query.default_limit,
        }
    }

    fn database_path(&self) -> Result<PathBuf> {
        config::resolve_database_path(self.db.as_deref(), self.configured_db.as_deref())
    }

    /// Opens the database read-only.
    pub fn open_store(&self) -> Result<SqliteStore> {
        Ok(SqliteStore::open(self.database_path()?)?)
    }

    /// Opens the database for writing.
    pub fn open_store_writable(&self) -> Result<SqliteStore> {
        Ok(SqliteStore::open_writable(self.database_path()?)?)
    }
}
