//! On-disk Things database fixture.

#![allow(dead_code)]

use std::path::PathBuf;

use rusqlite::{params, Connection};
use tempfile::TempDir;

const SCHEMA: &str = r#"
CREATE TABLE TMArea (
    uuid TEXT PRIMARY KEY,
    title TEXT,
    "index" INTEGER DEFAULT 0
);
CREATE TABLE TMTag (
    uuid TEXT PRIMARY KEY,
    title TEXT
);
CREATE TABLE TMTaskTag (
    tasks TEXT NOT NULL,
    tags TEXT NOT NULL
);
CREATE TABLE TMTask (
    uuid TEXT PRIMARY KEY,
    type INTEGER NOT NULL DEFAULT 0,
    title TEXT,
    status INTEGER NOT NULL DEFAULT 0,
    trashed INTEGER NOT NULL DEFAULT 0,
    notes TEXT,
    start INTEGER DEFAULT 1,
    startDate INTEGER,
    startBucket INTEGER DEFAULT 0,
    deadline INTEGER,
    deadlineSuppressionDate INTEGER,
    stopDate REAL,
    creationDate REAL,
    userModificationDate REAL,
    "index" INTEGER DEFAULT 0,
    todayIndex INTEGER,
    project TEXT,
    area TEXT,
    heading TEXT,
    rt1_recurrenceRule BLOB,
    rt1_instanceCreationStartDate INTEGER,
    rt1_instanceCreationPaused INTEGER DEFAULT 0,
    rt1_instanceCreationCount INTEGER DEFAULT 0,
    rt1_afterCompletionReferenceDate INTEGER,
    rt1_nextInstanceStartDate INTEGER,
    rt1_repeatingTemplate TEXT
);
"#;

/// A throwaway database with a handful of rows.
pub struct Fixture {
    _dir: TempDir,
    pub path: PathBuf,
    conn: Connection,
}

/// Columns of one `TMTask` row; everything else takes the schema default.
pub struct Row<'a> {
    pub uuid: &'a str,
    pub kind: i64,
    pub title: &'a str,
    pub index: i64,
    pub status: i64,
    pub trashed: bool,
    pub notes: Option<&'a str>,
    pub project: Option<&'a str>,
    pub area: Option<&'a str>,
    pub heading: Option<&'a str>,
    pub created: f64,
    pub deadline: Option<i64>,
}

impl<'a> Row<'a> {
    pub fn todo(uuid: &'a str, title: &'a str, index: i64) -> Self {
        Self {
            uuid,
            kind: 0,
            title,
            index,
            status: 0,
            trashed: false,
            notes: None,
            project: None,
            area: None,
            heading: None,
            created: 1_735_689_600.0,
            deadline: None,
        }
    }
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("main.sqlite");
        let conn = Connection::open(&path).expect("failed to create database");
        conn.execute_batch(SCHEMA).expect("failed to create schema");
        Self {
            _dir: dir,
            path,
            conn,
        }
    }

    pub fn area(&self, uuid: &str, title: &str) -> &Self {
        self.conn
            .execute(
                "INSERT INTO TMArea (uuid, title) VALUES (?, ?)",
                params![uuid, title],
            )
            .expect("insert area");
        self
    }

    pub fn tag(&self, uuid: &str, title: &str) -> &Self {
        self.conn
            .execute(
                "INSERT INTO TMTag (uuid, title) VALUES (?, ?)",
                params![uuid, title],
            )
            .expect("insert tag");
        self
    }

    pub fn tag_task(&self, task: &str, tag: &str) -> &Self {
        self.conn
            .execute(
                "INSERT INTO TMTaskTag (tasks, tags) VALUES (?, ?)",
                params![task, tag],
            )
            .expect("insert task tag");
        self
    }

    pub fn task(&self, row: Row<'_>) -> &Self {
        self.conn
            .execute(
                "INSERT INTO TMTask (uuid, type, title, \"index\", status, trashed, notes, \
                 project, area, heading, creationDate, userModificationDate, deadline) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    row.uuid,
                    row.kind,
                    row.title,
                    row.index,
                    row.status,
                    row.trashed,
                    row.notes,
                    row.project,
                    row.area,
                    row.heading,
                    row.created,
                    row.created,
                    row.deadline,
                ],
            )
            .expect("insert task");
        self
    }

    pub fn execute(&self, sql: &str) {
        self.conn.execute_batch(sql).expect("execute sql");
    }

    /// Reads one column of a task as an SQL value.
    pub fn column(&self, uuid: &str, column: &str) -> rusqlite::types::Value {
        self.conn
            .query_row(
                &format!("SELECT {column} FROM TMTask WHERE uuid = ?"),
                [uuid],
                |row| row.get(0),
            )
            .expect("read column")
    }

    /// The standard sample: a Home area, a Garden project with a heading,
    /// a trashed project and a few to-dos.
    pub fn sample() -> Self {
        let fx = Self::new();
        fx.area("A-HOME", "Home").tag("G-ERR", "errand").tag("G-WORK", "Work");
        fx.task(Row {
            kind: 1,
            area: Some("A-HOME"),
            ..Row::todo("P-GARDEN", "Garden", 1)
        });
        fx.task(Row {
            kind: 2,
            project: Some("P-GARDEN"),
            ..Row::todo("H-SPRING", "Spring", 2)
        });
        fx.task(Row {
            kind: 1,
            trashed: true,
            ..Row::todo("P-OLD", "Old stuff", 3)
        });
        fx.task(Row {
            project: Some("P-GARDEN"),
            deadline: Some((2025 << 16) | (3 << 12) | (1 << 7)),
            ..Row::todo("T-SEEDS", "Buy seeds", 10)
        });
        fx.task(Row {
            heading: Some("H-SPRING"),
            notes: Some("see https://example.com/bulbs"),
            ..Row::todo("T-BULBS", "Plant bulbs", 11)
        });
        fx.task(Row {
            area: Some("A-HOME"),
            ..Row::todo("T-LAMP", "Fix lamp", 12)
        });
        fx.task(Row {
            status: 3,
            ..Row::todo("T-DONE", "Call plumber", 13)
        });
        fx.task(Row {
            trashed: true,
            ..Row::todo("T-BIN", "Shred papers", 14)
        });
        fx.task(Row {
            project: Some("P-OLD"),
            ..Row::todo("T-ORPHAN", "Sort boxes", 15)
        });
        fx.task(Row::todo("T-MILK", "buy milk", 16));
        fx.tag_task("T-SEEDS", "G-ERR")
            .tag_task("T-SEEDS", "G-WORK")
            .tag_task("T-MILK", "G-ERR");
        fx.execute(
            "INSERT INTO TMTask (uuid, type, title, \"index\", rt1_recurrenceRule) \
             VALUES ('T-WEEKLY', 0, 'Water plants', 20, X'00')",
        );
        fx
    }
}
