//! Built-in list views.
//!
//! A view narrows the structured filter to one of the lists Things shows in
//! its sidebar. Each view contributes one or more [`ViewScope`]s: a base
//! predicate with its own bindings and a fallback order. The user's flags
//! still apply on top, and an explicit sort still wins over the view order.
//!
//! `today` runs three scopes and merges them; `today` and `deadlines` are
//! ordered in memory, so their pagination happens after the merge.

use things_model::{Task, TaskStatus, ThingsDate};

use super::plan::QueryParam;
use super::{TaskFilter, TaskQueryOptions};

/// Limit of the `repeating` view when none is given.
pub const REPEATING_DEFAULT_LIMIT: usize = 200;

/// One base restriction of a view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewScope {
    /// SQL fragment over the task query aliases, `?` placeholders only.
    pub predicate: &'static str,
    pub params: Vec<QueryParam>,
    /// Used when the caller gives no sort.
    pub order_by: Option<&'static str>,
}

impl ViewScope {
    fn new(predicate: &'static str) -> Self {
        Self {
            predicate,
            params: Vec::new(),
            order_by: None,
        }
    }

    fn bind(mut self, param: impl Into<QueryParam>) -> Self {
        self.params.push(param.into());
        self
    }

    fn ordered_by(mut self, order_by: &'static str) -> Self {
        self.order_by = Some(order_by);
        self
    }
}

/// The sidebar lists of Things.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListView {
    Inbox,
    Today,
    Upcoming,
    Anytime,
    Someday,
    Deadlines,
    Logbook,
    Completed,
    Canceled,
    Trash,
    Repeating,
}

impl ListView {
    pub const ALL: [ListView; 11] = [
        ListView::Inbox,
        ListView::Today,
        ListView::Upcoming,
        ListView::Anytime,
        ListView::Someday,
        ListView::Deadlines,
        ListView::Logbook,
        ListView::Completed,
        ListView::Canceled,
        ListView::Trash,
        ListView::Repeating,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ListView::Inbox => "inbox",
            ListView::Today => "today",
            ListView::Upcoming => "upcoming",
            ListView::Anytime => "anytime",
            ListView::Someday => "someday",
            ListView::Deadlines => "deadlines",
            ListView::Logbook => "logbook",
            ListView::Completed => "completed",
            ListView::Canceled => "canceled",
            ListView::Trash => "trash",
            ListView::Repeating => "repeating",
        }
    }

    /// Status word used when the caller gives none.
    pub const fn default_status(self) -> &'static str {
        match self {
            ListView::Logbook | ListView::Trash => "any",
            ListView::Completed => "completed",
            ListView::Canceled => "canceled",
            _ => "incomplete",
        }
    }

    /// Whether the rows are ordered in memory after fetching.
    pub const fn sorts_in_memory(self) -> bool {
        matches!(self, ListView::Today | ListView::Deadlines)
    }

    /// Fills in the view's defaults where `opts` leaves them open.
    pub fn options(self, opts: &TaskQueryOptions) -> TaskQueryOptions {
        let mut opts = opts.clone();
        if opts.status.is_none() {
            opts.status = Some(self.default_status().to_string());
        }
        if self == ListView::Repeating {
            opts.repeating_only = true;
            opts.limit = opts.limit.or(Some(REPEATING_DEFAULT_LIMIT));
        }
        opts
    }

    /// Overrides the parts of a compiled filter the view owns.
    pub fn restrict(self, filter: &mut TaskFilter) {
        match self {
            ListView::Completed => filter.status = Some(TaskStatus::Completed),
            ListView::Canceled => filter.status = Some(TaskStatus::Canceled),
            ListView::Trash => {
                filter.include_trashed = true;
                filter.exclude_trashed_context = false;
            }
            _ => {}
        }
    }

    /// The base restrictions, relative to `today`. Completed, canceled and
    /// repeating work through the filter alone and have none.
    pub fn scopes(self, today: ThingsDate) -> Vec<ViewScope> {
        match self {
            ListView::Inbox => vec![ViewScope::new("t.start = 0")],
            ListView::Anytime => vec![ViewScope::new("t.start = 1")],
            ListView::Someday => vec![ViewScope::new("t.start = 2 AND t.startDate IS NULL")],
            ListView::Upcoming => vec![ViewScope::new(
                "t.start = 2 AND t.startDate IS NOT NULL AND t.startDate > ?",
            )
            .bind(today)],
            ListView::Today => vec![
                ViewScope::new("t.start = 1 AND t.startDate IS NOT NULL")
                    .ordered_by("t.todayIndex"),
                ViewScope::new("t.start = 2 AND t.startDate IS NOT NULL AND t.startDate <= ?")
                    .bind(today)
                    .ordered_by("t.todayIndex"),
                ViewScope::new(
                    "t.startDate IS NULL AND t.deadline IS NOT NULL AND t.deadline <= ? \
                     AND t.deadlineSuppressionDate IS NULL",
                )
                .bind(today)
                .ordered_by("t.todayIndex"),
            ],
            ListView::Deadlines => vec![ViewScope::new("t.deadline IS NOT NULL")],
            ListView::Logbook => vec![ViewScope::new("t.status IN (?, ?)")
                .bind(TaskStatus::Completed.code())
                .bind(TaskStatus::Canceled.code())
                .ordered_by("t.stopDate DESC")],
            ListView::Trash => vec![ViewScope::new("t.trashed = 1")],
            ListView::Completed | ListView::Canceled | ListView::Repeating => Vec::new(),
        }
    }

    /// Puts merged rows in view order. Stable, so ties keep database order.
    pub fn arrange(self, tasks: &mut [Task]) {
        match self {
            ListView::Today => tasks.sort_by(|a, b| {
                today_rank(a)
                    .cmp(&today_rank(b))
                    .then_with(|| a.start_date.cmp(&b.start_date))
            }),
            ListView::Deadlines => tasks.sort_by_key(|t| t.deadline),
            _ => {}
        }
    }
}

/// Unranked items go after every ranked one.
fn today_rank(task: &Task) -> i64 {
    task.today_index.unwrap_or(i64::MAX)
}

impl std::fmt::Display for ListView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
