//! The storage seam between the engine and the Things database.

use things_model::{RepeatTarget, RepeatUpdate, Task, TaskKind, TaskMatch};

use crate::error::StoreResult;
use crate::filter::QueryPlan;

/// Kinds of named references a listing filter can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Project,
    Area,
    Tag,
}

impl ReferenceKind {
    /// Lowercase label used in messages.
    pub const fn label(self) -> &'static str {
        match self {
            ReferenceKind::Project => "project",
            ReferenceKind::Area => "area",
            ReferenceKind::Tag => "tag",
        }
    }
}

/// Operations the engine needs from a task store.
///
/// [`crate::SqliteStore`] is the production implementation; tests use
/// in-memory fakes.
pub trait TaskRepository {
    /// Runs a compiled plan and returns the matching rows in plan order.
    fn tasks(&self, plan: &QueryPlan) -> StoreResult<Vec<Task>>;

    /// Resolves a reference by exact identifier, then by case-insensitive
    /// exact title.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::NotFound`] when neither matches.
    fn resolve_reference(&self, kind: ReferenceKind, input: &str) -> StoreResult<String>;

    /// Rows of `kind` titled exactly `title` created at or after `since`
    /// (epoch seconds), newest first.
    fn tasks_by_title_since(
        &self,
        title: &str,
        kind: TaskKind,
        since: f64,
    ) -> StoreResult<Vec<TaskMatch>>;

    /// Loads the metadata needed to validate a repeat change.
    fn repeat_target(&self, id: &str) -> StoreResult<RepeatTarget>;

    /// Writes a recurrence rule to a task.
    fn apply_repeat_rule(&self, id: &str, update: &RepeatUpdate) -> StoreResult<()>;

    /// Removes the recurrence rule and all of its bookkeeping from a task.
    fn clear_repeat_rule(&self, id: &str) -> StoreResult<()>;
}
