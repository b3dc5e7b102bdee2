//! Query and recurrence engine for the Things 3 database.
//!
//! This crate turns listing options into SQL against the Things SQLite
//! database, refines results with a small query language, and builds the
//! recurrence rules Things stores for repeating to-dos and projects.
//!
//! - [`filter`] compiles [`TaskQueryOptions`] into a [`QueryPlan`], optionally
//!   scoped to a sidebar [`ListView`]
//! - [`query`] parses and evaluates rich queries such as
//!   `title:/^call/i AND NOT tag:waiting`
//! - [`repeat`] builds and writes recurrence rules
//! - [`SqliteStore`] implements [`TaskRepository`] over the real database
//!
//! # Example
//!
//! ```no_run
//! use things_db::{fetch_tasks, SqliteStore, TaskQueryOptions};
//!
//! let store = SqliteStore::open("/path/to/main.sqlite")?;
//! let opts = TaskQueryOptions {
//!     query: Some("tag:errand OR url:true".to_string()),
//!     sort: Some("-deadline".to_string()),
//!     limit: Some(20),
//!     ..Default::default()
//! };
//! for task in fetch_tasks(&store, &opts, false)? {
//!     println!("{} {}", task.uuid, task.title);
//! }
//! # Ok::<(), things_db::Error>(())
//! ```

pub mod error;
pub mod fetch;
pub mod filter;
pub mod query;
pub mod repeat;
pub mod repository;
pub mod store;
pub mod wait;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result, StoreError, StoreResult};
pub use fetch::{apply_offset_limit, fetch_tasks, fetch_view};
pub use filter::{
    compile_filter, compile_filter_in, parse_status, FilterError, ListView, QueryParam, QueryPlan,
    SortField, SortKey, SortSpec, TaskFilter, TaskQueryOptions, ViewScope,
};
pub use query::{parse_rich_query, Query, QueryError};
pub use repeat::{
    apply_repeat, build_update, RepeatAction, RepeatError, RepeatMode, RepeatSpec, RepeatUnit,
};
pub use repository::{ReferenceKind, TaskRepository};
pub use store::{discover_database_path, SqliteStore};
pub use wait::{wait_for_created, Clock, SystemClock, WaitError, WaitPolicy};
