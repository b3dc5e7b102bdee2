//! SQLite access to the Things database.
//!
//! The database belongs to the Things app. Listing opens it read-only; only
//! the repeat commands open it for writing, and they touch nothing but the
//! recurrence columns of a single row.
//!
//! Things keeps its database inside a group container:
//!
//! ```text
//! ~/Library/Group Containers/JLMPQHK86H.com.culturedcode.ThingsMac/
//!     ThingsData-XXXXX/Things Database.thingsdatabase/main.sqlite
//! ```
//!
//! [`discover_database_path`] finds it given a home directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::types::ToSqlOutput;
use rusqlite::{params, params_from_iter, Connection, OpenFlags, OptionalExtension, Row, ToSql};
use strsim::levenshtein;
use things_model::{
    timestamp_to_datetime, RepeatTarget, RepeatUpdate, StartBucket, Task, TaskKind, TaskMatch,
    TaskStatus, ThingsDate,
};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::filter::{QueryParam, QueryPlan};
use crate::repository::{ReferenceKind, TaskRepository};

/// Group container of the Things app, relative to the home directory.
const GROUP_CONTAINER: &str =
    "Library/Group Containers/JLMPQHK86H.com.culturedcode.ThingsMac";

/// Database file, relative to a `ThingsData-*` directory.
const DATABASE_FILE: &str = "Things Database.thingsdatabase/main.sqlite";

/// Separator used to pack tag titles into one column.
const TAG_SEPARATOR: char = '\u{1f}';

/// Maximum Levenshtein distance to consider a name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

const TASK_SELECT: &str = "SELECT t.uuid, t.type, t.title, t.status, t.trashed, t.notes, \
     t.start, t.startDate, t.deadline, t.stopDate, t.creationDate, t.userModificationDate, \
     t.\"index\", t.todayIndex, (t.rt1_recurrenceRule IS NOT NULL) AS repeating, \
     t.project, p.title, t.area, a.title, t.heading, h.title, \
     (SELECT group_concat(title, '\u{1f}') FROM (\
     SELECT tag.title AS title FROM TMTag tag \
     JOIN TMTaskTag tt ON tt.tags = tag.uuid \
     WHERE tt.tasks = t.uuid ORDER BY tag.title COLLATE NOCASE)) \
     FROM TMTask t \
     LEFT JOIN TMTask p ON t.project = p.uuid \
     LEFT JOIN TMArea a ON t.area = a.uuid \
     LEFT JOIN TMTask h ON t.heading = h.uuid \
     LEFT JOIN TMTask hp ON h.project = hp.uuid";

impl ToSql for QueryParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            QueryParam::Int(value) => ToSqlOutput::from(*value),
            QueryParam::Real(value) => ToSqlOutput::from(*value),
            QueryParam::Text(value) => ToSqlOutput::from(value.as_str()),
        })
    }
}

/// Finds the Things database under `home`.
///
/// Returns the first `ThingsData-*` directory (in name order) holding a
/// database, then the pre-3.15 location directly inside the container.
pub fn discover_database_path(home: &Path) -> Option<PathBuf> {
    let container = home.join(GROUP_CONTAINER);
    let mut data_dirs: Vec<PathBuf> = fs::read_dir(&container)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("ThingsData-"))
        .map(|entry| entry.path())
        .collect();
    data_dirs.sort();

    data_dirs
        .into_iter()
        .map(|dir| dir.join(DATABASE_FILE))
        .chain(std::iter::once(container.join(DATABASE_FILE)))
        .find(|candidate| candidate.is_file())
}

/// A connection to a Things database.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    path: PathBuf,
}

impl SqliteStore {
    /// Opens the database read-only.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingPath`] for an empty path,
    /// [`StoreError::DatabaseNotFound`] when the file does not exist, or the
    /// SQLite error.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with(path.as_ref(), OpenFlags::SQLITE_OPEN_READ_ONLY)
    }

    /// Opens the database for reading and writing.
    pub fn open_writable(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with(path.as_ref(), OpenFlags::SQLITE_OPEN_READ_WRITE)
    }

    fn open_with(path: &Path, mode: OpenFlags) -> StoreResult<Self> {
        if path.as_os_str().is_empty() {
            return Err(StoreError::MissingPath);
        }
        if !path.is_file() {
            return Err(StoreError::DatabaseNotFound {
                path: path.to_path_buf(),
            });
        }
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let conn = Connection::open_with_flags(&path, mode | OpenFlags::SQLITE_OPEN_NO_MUTEX)?;
        let read_only = !mode.contains(OpenFlags::SQLITE_OPEN_READ_WRITE);
        debug!(path = %path.display(), read_only, "opened database");
        Ok(Self { conn, path })
    }

    /// The resolved database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lookup_uuid(&self, sql: &str, input: &str) -> StoreResult<Option<String>> {
        Ok(self
            .conn
            .query_row(sql, [input], |row| row.get(0))
            .optional()?)
    }

    /// Closest title of `kind` to `input`, for not-found messages.
    fn suggest_reference(&self, kind: ReferenceKind, input: &str) -> StoreResult<Option<String>> {
        let sql = match kind {
            ReferenceKind::Project => "SELECT title FROM TMTask WHERE type = 1 AND trashed = 0",
            ReferenceKind::Area => "SELECT title FROM TMArea",
            ReferenceKind::Tag => "SELECT title FROM TMTag",
        };
        let mut stmt = self.conn.prepare(sql)?;
        let titles = stmt
            .query_map([], |row| row.get::<_, Option<String>>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let input = input.to_lowercase();
        let best = titles
            .into_iter()
            .flatten()
            .filter(|title| !title.is_empty())
            .map(|title| {
                let distance = levenshtein(&input, &title.to_lowercase());
                (title, distance)
            })
            .min_by_key(|(_, d)| *d);
        Ok(best
            .filter(|(_, d)| *d > 0 && *d <= MAX_SUGGESTION_DISTANCE)
            .map(|(title, _)| title))
    }
}

fn modification_timestamp() -> f64 {
    Utc::now().timestamp() as f64
}

fn code_error(column: usize, value: i64) -> rusqlite::Error {
    rusqlite::Error::IntegralValueOutOfRange(column, value)
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let kind_code: i64 = row.get(1)?;
    let status_code: i64 = row.get(3)?;
    let tags: Option<String> = row.get(21)?;

    Ok(Task {
        uuid: row.get(0)?,
        kind: TaskKind::from_code(kind_code).ok_or_else(|| code_error(1, kind_code))?,
        title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        status: TaskStatus::from_code(status_code).ok_or_else(|| code_error(3, status_code))?,
        trashed: row.get::<_, Option<bool>>(4)?.unwrap_or(false),
        notes: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        start: row
            .get::<_, Option<i64>>(6)?
            .and_then(StartBucket::from_code),
        start_date: row.get::<_, Option<i64>>(7)?.map(ThingsDate::from_raw),
        deadline: row.get::<_, Option<i64>>(8)?.map(ThingsDate::from_raw),
        stop_date: row.get::<_, Option<f64>>(9)?.and_then(timestamp_to_datetime),
        created: row.get::<_, Option<f64>>(10)?.and_then(timestamp_to_datetime),
        modified: row.get::<_, Option<f64>>(11)?.and_then(timestamp_to_datetime),
        index: row.get::<_, Option<i64>>(12)?.unwrap_or(0),
        today_index: row.get(13)?,
        repeating: row.get::<_, Option<i64>>(14)?.is_some_and(|v| v != 0),
        project_id: row.get(15)?,
        project_title: row.get(16)?,
        area_id: row.get(17)?,
        area_title: row.get(18)?,
        heading_id: row.get(19)?,
        heading_title: row.get(20)?,
        tags: tags
            .filter(|s| !s.is_empty())
            .map(|s| s.split(TAG_SEPARATOR).map(str::to_string).collect())
            .unwrap_or_default(),
    })
}

impl TaskRepository for SqliteStore {
    fn tasks(&self, plan: &QueryPlan) -> StoreResult<Vec<Task>> {
        let (tail, params) = plan.sql_tail();
        let sql = format!("{TASK_SELECT}{tail}");
        debug!(%sql, params = params.len(), "running task query");

        let mut stmt = self.conn.prepare(&sql)?;
        let tasks = stmt
            .query_map(params_from_iter(params.iter()), task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    fn resolve_reference(&self, kind: ReferenceKind, input: &str) -> StoreResult<String> {
        let (by_id, by_title) = match kind {
            ReferenceKind::Project => (
                "SELECT uuid FROM TMTask WHERE type = 1 AND uuid = ?",
                "SELECT uuid FROM TMTask WHERE type = 1 AND lower(title) = lower(?)",
            ),
            ReferenceKind::Area => (
                "SELECT uuid FROM TMArea WHERE uuid = ?",
                "SELECT uuid FROM TMArea WHERE lower(title) = lower(?)",
            ),
            ReferenceKind::Tag => (
                "SELECT uuid FROM TMTag WHERE uuid = ?",
                "SELECT uuid FROM TMTag WHERE lower(title) = lower(?)",
            ),
        };

        if let Some(id) = self.lookup_uuid(by_id, input)? {
            return Ok(id);
        }
        if let Some(id) = self.lookup_uuid(by_title, input)? {
            return Ok(id);
        }
        Err(StoreError::NotFound {
            kind,
            input: input.to_string(),
            suggestion: self.suggest_reference(kind, input)?,
        })
    }

    fn tasks_by_title_since(
        &self,
        title: &str,
        kind: TaskKind,
        since: f64,
    ) -> StoreResult<Vec<TaskMatch>> {
        if title.trim().is_empty() {
            return Err(StoreError::TitleRequired);
        }
        let mut stmt = self.conn.prepare(
            "SELECT uuid, creationDate FROM TMTask \
             WHERE type = ? AND title = ? AND creationDate >= ? \
             ORDER BY creationDate DESC",
        )?;
        let matches = stmt
            .query_map(params![kind.code(), title, since], |row| {
                Ok(TaskMatch {
                    uuid: row.get(0)?,
                    created: row.get::<_, Option<f64>>(1)?.unwrap_or(0.0),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(matches)
    }

    fn repeat_target(&self, id: &str) -> StoreResult<RepeatTarget> {
        if id.trim().is_empty() {
            return Err(StoreError::IdRequired);
        }
        let target = self
            .conn
            .query_row(
                "SELECT uuid, title, type, status, trashed, (rt1_recurrenceRule IS NOT NULL), \
                 rt1_repeatingTemplate FROM TMTask WHERE uuid = ?",
                [id],
                |row| {
                    Ok(RepeatTarget {
                        uuid: row.get(0)?,
                        title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                        kind: row.get::<_, Option<i64>>(2)?.and_then(TaskKind::from_code),
                        status: row.get::<_, Option<i64>>(3)?.and_then(TaskStatus::from_code),
                        trashed: row.get::<_, Option<bool>>(4)?.unwrap_or(false),
                        repeating: row.get::<_, Option<i64>>(5)?.is_some_and(|v| v != 0),
                        repeating_template_id: row
                            .get::<_, Option<String>>(6)?
                            .filter(|s| !s.is_empty()),
                    })
                },
            )
            .optional()?;
        target.ok_or_else(|| StoreError::TaskNotFound { id: id.to_string() })
    }

    fn apply_repeat_rule(&self, id: &str, update: &RepeatUpdate) -> StoreResult<()> {
        if id.trim().is_empty() {
            return Err(StoreError::IdRequired);
        }
        if update.recurrence_rule.is_empty() {
            return Err(StoreError::RuleRequired);
        }

        let mut sql = String::from(
            "UPDATE TMTask SET \
             rt1_recurrenceRule = ?, \
             rt1_instanceCreationStartDate = ?, \
             rt1_instanceCreationPaused = ?, \
             rt1_instanceCreationCount = ?, \
             rt1_afterCompletionReferenceDate = ?, \
             rt1_nextInstanceStartDate = ?, \
             start = 2, startDate = NULL, startBucket = 0, ",
        );
        let mut values: Vec<Box<dyn ToSql>> = vec![
            Box::new(update.recurrence_rule.clone()),
            Box::new(update.instance_creation_start_date.raw()),
            Box::new(i64::from(update.instance_creation_paused)),
            Box::new(update.instance_creation_count),
            Box::new(update.after_completion_reference.map(ThingsDate::raw)),
            Box::new(update.next_instance_start_date.map(ThingsDate::raw)),
        ];
        if update.set_deadline {
            sql.push_str("deadline = ?, deadlineSuppressionDate = NULL, ");
            values.push(Box::new(update.deadline.map(ThingsDate::raw)));
        }
        sql.push_str("userModificationDate = ? WHERE uuid = ?");
        values.push(Box::new(modification_timestamp()));
        values.push(Box::new(id.to_string()));

        let changed = self
            .conn
            .execute(&sql, params_from_iter(values.iter().map(|v| v.as_ref())))?;
        debug!(id, changed, "applied repeat rule");
        if changed == 0 {
            return Err(StoreError::TaskNotFound { id: id.to_string() });
        }
        Ok(())
    }

    fn clear_repeat_rule(&self, id: &str) -> StoreResult<()> {
        if id.trim().is_empty() {
            return Err(StoreError::IdRequired);
        }
        let changed = self.conn.execute(
            "UPDATE TMTask SET \
             rt1_recurrenceRule = NULL, \
             rt1_instanceCreationStartDate = NULL, \
             rt1_instanceCreationPaused = 0, \
             rt1_instanceCreationCount = 0, \
             rt1_afterCompletionReferenceDate = NULL, \
             rt1_nextInstanceStartDate = NULL, \
             deadline = NULL, \
             deadlineSuppressionDate = NULL, \
             userModificationDate = ? \
             WHERE uuid = ?",
            params![modification_timestamp(), id],
        )?;
        debug!(id, changed, "cleared repeat rule");
        if changed == 0 {
            return Err(StoreError::TaskNotFound { id: id.to_string() });
        }
        Ok(())
    }
}
