//! Sort specifications.
//!
//! A sort spec is a comma-separated list of field names, each optionally
//! prefixed with `-` for descending order, e.g. `-deadline,title`. The same
//! spec drives both the SQL `ORDER BY` clause and the in-memory sort used
//! after rich query filtering.

use std::cmp::Ordering;

use strsim::levenshtein;
use things_model::Task;

use super::error::{FilterError, FilterResult};

/// Maximum Levenshtein distance to consider a name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Order used when no sort spec is given.
pub const DEFAULT_ORDER_BY: &str = "t.\"index\"";

/// A sortable task attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Created,
    Modified,
    Deadline,
    Start,
    Title,
    Project,
    Area,
    Heading,
    Status,
    Uuid,
    Index,
    TodayIndex,
}

impl SortField {
    /// Every field, in the order they are listed in help text.
    pub const ALL: [SortField; 12] = [
        SortField::Created,
        SortField::Modified,
        SortField::Deadline,
        SortField::Start,
        SortField::Title,
        SortField::Project,
        SortField::Area,
        SortField::Heading,
        SortField::Status,
        SortField::Uuid,
        SortField::Index,
        SortField::TodayIndex,
    ];

    /// Canonical name.
    pub const fn name(self) -> &'static str {
        match self {
            SortField::Created => "created",
            SortField::Modified => "modified",
            SortField::Deadline => "deadline",
            SortField::Start => "start",
            SortField::Title => "title",
            SortField::Project => "project",
            SortField::Area => "area",
            SortField::Heading => "heading",
            SortField::Status => "status",
            SortField::Uuid => "uuid",
            SortField::Index => "index",
            SortField::TodayIndex => "today_idx",
        }
    }

    /// Looks up a field by name or alias (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        let canonical = match lower.as_str() {
            "due" => "deadline",
            "proj" => "project",
            "today-index" | "today_index" => "today_idx",
            other => other,
        };
        Self::ALL.into_iter().find(|f| f.name() == canonical)
    }

    /// SQL expression over the task query's table aliases.
    pub const fn order_expr(self) -> &'static str {
        match self {
            SortField::Created => "t.creationDate",
            SortField::Modified => "t.userModificationDate",
            SortField::Deadline => "t.deadline",
            SortField::Start => "t.startDate",
            SortField::Title => "t.title COLLATE NOCASE",
            SortField::Project => "p.title COLLATE NOCASE",
            SortField::Area => "a.title COLLATE NOCASE",
            SortField::Heading => "h.title COLLATE NOCASE",
            SortField::Status => "t.status",
            SortField::Uuid => "t.uuid",
            SortField::Index => "t.\"index\"",
            SortField::TodayIndex => "t.todayIndex",
        }
    }

    /// Compares two tasks on this field in ascending order.
    ///
    /// Missing values sort first, the way SQLite orders NULLs.
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortField::Created => a.created.cmp(&b.created),
            SortField::Modified => a.modified.cmp(&b.modified),
            SortField::Deadline => a.deadline.cmp(&b.deadline),
            SortField::Start => a.start_date.cmp(&b.start_date),
            SortField::Title => nocase(Some(&a.title), Some(&b.title)),
            SortField::Project => nocase(a.project_title.as_deref(), b.project_title.as_deref()),
            SortField::Area => nocase(a.area_title.as_deref(), b.area_title.as_deref()),
            SortField::Heading => nocase(a.heading_title.as_deref(), b.heading_title.as_deref()),
            SortField::Status => a.status.code().cmp(&b.status.code()),
            SortField::Uuid => a.uuid.cmp(&b.uuid),
            SortField::Index => a.index.cmp(&b.index),
            SortField::TodayIndex => a.today_index.cmp(&b.today_index),
        }
    }
}

fn nocase(a: Option<&str>, b: Option<&str>) -> Ordering {
    a.map(str::to_lowercase).cmp(&b.map(str::to_lowercase))
}

/// One entry of a sort spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub descending: bool,
}

/// A parsed, ordered list of sort keys. The first key has the highest
/// priority.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// Parses a comma-separated sort spec. Blank entries are skipped.
    ///
    /// # Example
    ///
    /// ```
    /// use things_db::{SortField, SortSpec};
    ///
    /// let spec = SortSpec::parse("-due, title").unwrap();
    /// assert_eq!(spec.keys()[0].field, SortField::Deadline);
    /// assert!(spec.keys()[0].descending);
    /// assert_eq!(
    ///     spec.order_by().as_deref(),
    ///     Some("t.deadline DESC, t.title COLLATE NOCASE ASC")
    /// );
    /// ```
    pub fn parse(spec: &str) -> FilterResult<Self> {
        let mut keys = Vec::new();
        for part in spec.split(',') {
            let raw = part.trim();
            if raw.is_empty() {
                continue;
            }
            let (descending, name) = match raw.strip_prefix('-') {
                Some(rest) => (true, rest.trim()),
                None => (false, raw),
            };
            let field = SortField::from_name(name).ok_or_else(|| FilterError::InvalidSortField {
                field: raw.to_string(),
                suggestion: suggest_field(name),
            })?;
            keys.push(SortKey { field, descending });
        }
        Ok(Self { keys })
    }

    /// Builds a spec from keys directly.
    pub fn from_keys(keys: Vec<SortKey>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The SQL `ORDER BY` expression, or `None` for an empty spec.
    pub fn order_by(&self) -> Option<String> {
        if self.keys.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .keys
            .iter()
            .map(|k| {
                let dir = if k.descending { "DESC" } else { "ASC" };
                format!("{} {}", k.field.order_expr(), dir)
            })
            .collect();
        Some(parts.join(", "))
    }

    /// Stable multi-key sort in memory.
    pub fn sort_tasks(&self, tasks: &mut [Task]) {
        if self.keys.is_empty() {
            return;
        }
        tasks.sort_by(|a, b| {
            self.keys
                .iter()
                .map(|k| {
                    let ord = k.field.compare(a, b);
                    if k.descending {
                        ord.reverse()
                    } else {
                        ord
                    }
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }
}

/// Finds the closest known field name for an unrecognised one.
fn suggest_field(name: &str) -> Option<String> {
    let lower = name.to_lowercase();
    let (best, distance) = SortField::ALL
        .iter()
        .map(|f| (f.name(), levenshtein(&lower, f.name())))
        .min_by_key(|(_, d)| *d)?;
    if distance > 0 && distance <= MAX_SUGGESTION_DISTANCE {
        Some(best.to_string())
    } else {
        None
    }
}
