//! The task listing pipeline: compile, query, refine, paginate.

use things_model::{Task, ThingsDate};
use tracing::debug;

use crate::filter::{compile_filter, ListView, TaskQueryOptions};
use crate::query::{filter_tasks, parse_rich_query};
use crate::repository::TaskRepository;
use crate::Result;

/// Lists tasks matching `opts`.
///
/// Pagination normally happens in the database. When a rich query is given,
/// or `force_post` is set, the database returns every candidate instead and
/// the rich query, the sort and then offset/limit are applied in memory, so
/// pages are counted over the refined result.
pub fn fetch_tasks<R>(repo: &R, opts: &TaskQueryOptions, force_post: bool) -> Result<Vec<Task>>
where
    R: TaskRepository + ?Sized,
{
    fetch(repo, opts, None, force_post)
}

/// Lists the tasks of a sidebar view, with `opts` narrowing it further.
///
/// `today` anchors the date-relative views (`today`, `upcoming`). Views that
/// merge or reorder rows in memory paginate after doing so.
pub fn fetch_view<R>(
    repo: &R,
    view: ListView,
    opts: &TaskQueryOptions,
    today: ThingsDate,
) -> Result<Vec<Task>>
where
    R: TaskRepository + ?Sized,
{
    let opts = view.options(opts);
    fetch(repo, &opts, Some((view, today)), view.sorts_in_memory())
}

fn fetch<R>(
    repo: &R,
    opts: &TaskQueryOptions,
    view: Option<(ListView, ThingsDate)>,
    force_post: bool,
) -> Result<Vec<Task>>
where
    R: TaskRepository + ?Sized,
{
    let (mut filter, sort) = compile_filter(repo, opts)?;
    let query = parse_rich_query(opts.query.as_deref().unwrap_or(""))?;

    let post_process = force_post || query.is_some();
    if post_process {
        filter.limit = None;
        filter.offset = None;
    }

    let mut tasks = match view {
        None => repo.tasks(&filter.to_query_plan())?,
        Some((view, today)) => {
            view.restrict(&mut filter);
            let scopes = view.scopes(today);
            let mut tasks = Vec::new();
            if scopes.is_empty() {
                tasks = repo.tasks(&filter.to_query_plan())?;
            }
            for scope in scopes {
                filter.scope = Some(scope);
                tasks.extend(repo.tasks(&filter.to_query_plan())?);
            }
            view.arrange(&mut tasks);
            debug!(%view, rows = tasks.len(), "fetched view");
            tasks
        }
    };
    debug!(candidates = tasks.len(), post_process, "fetched candidate tasks");

    if query.is_some() {
        tasks = filter_tasks(tasks, query.as_ref());
        debug!(matched = tasks.len(), "applied rich query");
    }

    if post_process {
        sort.sort_tasks(&mut tasks);
        tasks = apply_offset_limit(tasks, opts.limit, opts.offset);
    }
    Ok(tasks)
}

/// Skips `offset` items and keeps at most `limit`. A zero or missing limit
/// keeps everything.
pub fn apply_offset_limit(
    mut tasks: Vec<Task>,
    limit: Option<usize>,
    offset: Option<usize>,
) -> Vec<Task> {
    let offset = offset.unwrap_or(0);
    if offset >= tasks.len() {
        return Vec::new();
    }
    tasks.drain(..offset);
    if let Some(limit) = limit.filter(|l| *l > 0) {
        tasks.truncate(limit);
    }
    tasks
}
