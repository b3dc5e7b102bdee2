//! Structured filter compiler.
//!
//! Turns the flat, caller-facing options of a task listing
//! ([`TaskQueryOptions`]) into a resolved [`TaskFilter`] and a [`SortSpec`],
//! and compiles the filter into a [`QueryPlan`] the repository executes.
//!
//! Defaults: trashed items are hidden, only incomplete items are listed and
//! repeating templates are left out. `all` lifts the status and trash
//! restrictions.

mod dates;
mod error;
mod plan;
mod sort;
mod view;

pub use dates::{parse_date_or_time, parse_things_date, parse_timestamp_bound, DateBound};
pub(crate) use dates::resolve_local;
pub use error::{FilterError, FilterResult};
pub use plan::{escape_like, QueryParam, QueryPlan, DEFAULT_KINDS};
pub use sort::{SortField, SortKey, SortSpec, DEFAULT_ORDER_BY};
pub use view::{ListView, ViewScope, REPEATING_DEFAULT_LIMIT};

use chrono::{Local, TimeZone};
use things_model::{TaskKind, TaskStatus, ThingsDate};
use tracing::debug;

use crate::repository::{ReferenceKind, TaskRepository};
use crate::Result;

/// Raw listing options as the user typed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskQueryOptions {
    /// Status word; `None` means incomplete.
    pub status: Option<String>,
    pub include_trashed: bool,
    /// Any status, trashed included.
    pub all: bool,
    /// Project identifier or title.
    pub project: Option<String>,
    /// Area identifier or title.
    pub area: Option<String>,
    /// Tag identifier or title.
    pub tag: Option<String>,
    /// Free-text search over title, notes and area title.
    pub search: Option<String>,
    /// Rich query applied after the database query.
    pub query: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub created_before: Option<String>,
    pub created_after: Option<String>,
    pub modified_before: Option<String>,
    pub modified_after: Option<String>,
    pub due_before: Option<String>,
    pub start_before: Option<String>,
    pub include_repeating: bool,
    pub repeating_only: bool,
    pub has_url: Option<bool>,
    /// Sort spec such as `-deadline,title`.
    pub sort: Option<String>,
    /// Item kinds to list; empty means every kind.
    pub kinds: Vec<TaskKind>,
}

/// A resolved task filter.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub include_trashed: bool,
    /// Hide items whose project, or whose heading's project, is trashed.
    pub exclude_trashed_context: bool,
    pub project_id: Option<String>,
    pub area_id: Option<String>,
    pub tag_id: Option<String>,
    pub search: Option<String>,
    /// Epoch seconds, inclusive.
    pub created_after: Option<f64>,
    /// Epoch seconds, exclusive.
    pub created_before: Option<f64>,
    pub modified_after: Option<f64>,
    pub modified_before: Option<f64>,
    /// Inclusive upper bound on the deadline.
    pub due_before: Option<ThingsDate>,
    /// Inclusive upper bound on the start date.
    pub start_before: Option<ThingsDate>,
    pub has_url: Option<bool>,
    pub include_repeating: bool,
    pub repeating_only: bool,
    pub kinds: Vec<TaskKind>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub order: SortSpec,
    /// Base restriction of a list view.
    pub scope: Option<ViewScope>,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            status: Some(TaskStatus::Incomplete),
            include_trashed: false,
            exclude_trashed_context: true,
            project_id: None,
            area_id: None,
            tag_id: None,
            search: None,
            created_after: None,
            created_before: None,
            modified_after: None,
            modified_before: None,
            due_before: None,
            start_before: None,
            has_url: None,
            include_repeating: false,
            repeating_only: false,
            kinds: Vec::new(),
            limit: None,
            offset: None,
            order: SortSpec::default(),
            scope: None,
        }
    }
}

/// Parses a status word. `Ok(None)` means "any status".
///
/// # Example
///
/// ```
/// use things_db::parse_status;
/// use things_model::TaskStatus;
///
/// assert_eq!(parse_status("done").unwrap(), Some(TaskStatus::Completed));
/// assert_eq!(parse_status("any").unwrap(), None);
/// assert!(parse_status("later").is_err());
/// ```
pub fn parse_status(value: &str) -> FilterResult<Option<TaskStatus>> {
    match value.trim().to_lowercase().as_str() {
        "" | "incomplete" | "open" | "todo" => Ok(Some(TaskStatus::Incomplete)),
        "completed" | "complete" | "done" => Ok(Some(TaskStatus::Completed)),
        "canceled" | "cancelled" => Ok(Some(TaskStatus::Canceled)),
        "any" | "all" => Ok(None),
        _ => Err(FilterError::InvalidStatus {
            value: value.to_string(),
        }),
    }
}

/// Resolves listing options into a filter and sort spec, reading wall-clock
/// dates in the local zone.
pub fn compile_filter<R>(repo: &R, opts: &TaskQueryOptions) -> Result<(TaskFilter, SortSpec)>
where
    R: TaskRepository + ?Sized,
{
    compile_filter_in(repo, opts, &Local)
}

/// Like [`compile_filter`], with an explicit zone for date bounds.
pub fn compile_filter_in<R, Tz>(
    repo: &R,
    opts: &TaskQueryOptions,
    tz: &Tz,
) -> Result<(TaskFilter, SortSpec)>
where
    R: TaskRepository + ?Sized,
    Tz: TimeZone,
{
    let mut status = parse_status(opts.status.as_deref().unwrap_or(""))?;
    let mut include_trashed = opts.include_trashed;
    if opts.all {
        status = None;
        include_trashed = true;
    }

    let resolve = |kind: ReferenceKind, input: Option<&str>| -> Result<Option<String>> {
        match input.filter(|s| !s.is_empty()) {
            Some(input) => Ok(Some(repo.resolve_reference(kind, input)?)),
            None => Ok(None),
        }
    };
    let project_id = resolve(ReferenceKind::Project, opts.project.as_deref())?;
    let area_id = resolve(ReferenceKind::Area, opts.area.as_deref())?;
    let tag_id = resolve(ReferenceKind::Tag, opts.tag.as_deref())?;

    let sort = SortSpec::parse(opts.sort.as_deref().unwrap_or(""))?;

    let timestamp = |input: Option<&str>, is_before: bool| -> Result<Option<f64>> {
        input
            .map(|s| parse_timestamp_bound(s, is_before, tz))
            .transpose()
            .map_err(Into::into)
    };
    let calendar = |input: Option<&str>| -> Result<Option<ThingsDate>> {
        input
            .map(|s| parse_things_date(s, tz))
            .transpose()
            .map_err(Into::into)
    };

    let filter = TaskFilter {
        status,
        include_trashed,
        exclude_trashed_context: true,
        project_id,
        area_id,
        tag_id,
        search: opts.search.clone().filter(|s| !s.is_empty()),
        created_after: timestamp(opts.created_after.as_deref(), false)?,
        created_before: timestamp(opts.created_before.as_deref(), true)?,
        modified_after: timestamp(opts.modified_after.as_deref(), false)?,
        modified_before: timestamp(opts.modified_before.as_deref(), true)?,
        due_before: calendar(opts.due_before.as_deref())?,
        start_before: calendar(opts.start_before.as_deref())?,
        has_url: opts.has_url,
        include_repeating: opts.include_repeating || opts.repeating_only,
        repeating_only: opts.repeating_only,
        kinds: opts.kinds.clone(),
        limit: opts.limit,
        offset: opts.offset,
        order: sort.clone(),
        scope: None,
    };

    debug!(?filter, "compiled task filter");
    Ok((filter, sort))
}
