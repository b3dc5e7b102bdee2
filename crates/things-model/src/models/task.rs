//! Task model for the Things database.
//!
//! Things stores to-dos, projects and headings in one table (`TMTask`) and
//! tells them apart with a `type` column. [`Task`] is the read projection the
//! query engine works on; it carries the titles of the related project, area
//! and heading so that in-memory predicates never need a second lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::ThingsDate;

/// The kind of row stored in `TMTask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    /// A regular to-do.
    #[serde(rename = "to-do")]
    Todo,
    /// A project.
    Project,
    /// A heading inside a project.
    Heading,
}

impl TaskKind {
    /// The value of the `type` column.
    pub const fn code(self) -> i64 {
        match self {
            TaskKind::Todo => 0,
            TaskKind::Project => 1,
            TaskKind::Heading => 2,
        }
    }

    /// Maps a `type` column value back to a kind.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(TaskKind::Todo),
            1 => Some(TaskKind::Project),
            2 => Some(TaskKind::Heading),
            _ => None,
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            TaskKind::Todo => "to-do",
            TaskKind::Project => "project",
            TaskKind::Heading => "heading",
        }
    }
}

/// Completion status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Incomplete,
    Canceled,
    Completed,
}

impl TaskStatus {
    /// The value of the `status` column.
    pub const fn code(self) -> i64 {
        match self {
            TaskStatus::Incomplete => 0,
            TaskStatus::Canceled => 2,
            TaskStatus::Completed => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(TaskStatus::Incomplete),
            2 => Some(TaskStatus::Canceled),
            3 => Some(TaskStatus::Completed),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            TaskStatus::Incomplete => "incomplete",
            TaskStatus::Canceled => "canceled",
            TaskStatus::Completed => "completed",
        }
    }
}

/// Start classification (the `start` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StartBucket {
    Inbox,
    Anytime,
    Someday,
}

impl StartBucket {
    pub const fn code(self) -> i64 {
        match self {
            StartBucket::Inbox => 0,
            StartBucket::Anytime => 1,
            StartBucket::Someday => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(StartBucket::Inbox),
            1 => Some(StartBucket::Anytime),
            2 => Some(StartBucket::Someday),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            StartBucket::Inbox => "Inbox",
            StartBucket::Anytime => "Anytime",
            StartBucket::Someday => "Someday",
        }
    }
}

/// A to-do, project or heading as read from the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// The stable identifier (`uuid` column).
    pub uuid: String,

    /// Row kind.
    pub kind: TaskKind,

    /// Title text.
    pub title: String,

    /// Completion status.
    pub status: TaskStatus,

    /// Whether the task sits in the trash.
    #[serde(default)]
    pub trashed: bool,

    /// Free-form notes (empty when unset).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    /// Start classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<StartBucket>,

    /// Scheduled start date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<ThingsDate>,

    /// Deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<ThingsDate>,

    /// When the task was completed or canceled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_date: Option<DateTime<Utc>>,

    /// Whether a recurrence rule is attached.
    #[serde(default)]
    pub repeating: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,

    /// Manual ordering within the parent list.
    #[serde(default)]
    pub index: i64,

    /// Manual ordering within Today.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today_index: Option<i64>,

    /// Tag titles, sorted case-insensitively.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_title: Option<String>,
}

impl Task {
    /// Creates an incomplete to-do with only the identifier and title set.
    ///
    /// Mostly useful for tests and for building records field by field.
    pub fn new(uuid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            kind: TaskKind::Todo,
            title: title.into(),
            status: TaskStatus::Incomplete,
            trashed: false,
            notes: String::new(),
            start: None,
            start_date: None,
            deadline: None,
            stop_date: None,
            repeating: false,
            created: None,
            modified: None,
            index: 0,
            today_index: None,
            tags: Vec::new(),
            project_id: None,
            project_title: None,
            area_id: None,
            area_title: None,
            heading_id: None,
            heading_title: None,
        }
    }

    /// Project title, or the empty string when the task has no project.
    pub fn project_title_str(&self) -> &str {
        self.project_title.as_deref().unwrap_or("")
    }

    /// Area title, or the empty string.
    pub fn area_title_str(&self) -> &str {
        self.area_title.as_deref().unwrap_or("")
    }

    /// Heading title, or the empty string.
    pub fn heading_title_str(&self) -> &str {
        self.heading_title.as_deref().unwrap_or("")
    }
}

/// Minimal metadata needed to validate a repeat rule change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatTarget {
    pub uuid: String,
    pub title: String,
    pub kind: Option<TaskKind>,
    pub status: Option<TaskStatus>,
    pub trashed: bool,
    pub repeating: bool,
    /// Set when the row is a generated instance of a repeating template.
    pub repeating_template_id: Option<String>,
}

/// A task located by title after it was created outside this process.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskMatch {
    pub uuid: String,
    /// Creation time as epoch seconds.
    pub created: f64,
}
