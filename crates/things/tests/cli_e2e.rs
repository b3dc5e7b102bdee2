//! CLI-focused end-to-end tests against an on-disk Things database.
//!
//! These tests validate realistic user workflows via the `things` binary.
//! Every command runs in its own sandbox: a fresh database, a private config
//! path and no inherited `THINGSDB`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use rusqlite::{params, Connection};
use serde_json::Value;
use tempfile::TempDir;

const SCHEMA: &str = r#"
CREATE TABLE TMArea (uuid TEXT PRIMARY KEY, title TEXT, "index" INTEGER DEFAULT 0);
CREATE TABLE TMTag (uuid TEXT PRIMARY KEY, title TEXT);
CREATE TABLE TMTaskTag (tasks TEXT NOT NULL, tags TEXT NOT NULL);
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

const CREATED: f64 = 1_735_689_600.0;

struct CliE2eContext {
    bin_path: PathBuf,
    sandbox: TempDir,
    db_path: PathBuf,
    config_path: PathBuf,
}

impl CliE2eContext {
    fn new() -> Self {
        let sandbox = TempDir::new().expect("failed to create temporary sandbox");
        let db_path = sandbox.path().join("main.sqlite");
        let config_path = sandbox.path().join("things-config.toml");
        create_database(&db_path);

        Self {
            bin_path: PathBuf::from(env!("CARGO_BIN_EXE_things")),
            sandbox,
            db_path,
            config_path,
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.bin_path);
        cmd.args(args);
        cmd.env("THINGS_CONFIG", &self.config_path);
        cmd.env("XDG_CONFIG_HOME", self.sandbox.path().join("xdg-config"));
        cmd.env("HOME", self.sandbox.path());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("THINGSDB");
        cmd.env_remove("THINGS_AUTH_TOKEN");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Runs with `--db` pointing at the sandbox database.
    fn run_allow_failure(&self, args: &[&str]) -> Output {
        let mut cmd = self.command(args);
        cmd.env("THINGSDB", &self.db_path);
        cmd.output().expect("failed to run things command")
    }

    fn run(&self, args: &[&str]) -> Output {
        let output = self.run_allow_failure(args);

        if output.status.success() {
            return output;
        }

        panic!(
            "things command failed\nargs: {:?}\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
            args,
            output.status,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }

    fn run_stdout(&self, args: &[&str]) -> String {
        String::from_utf8_lossy(&self.run(args).stdout).into_owned()
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let stdout = self.run_stdout(args);
        serde_json::from_str(&stdout).unwrap_or_else(|err| {
            panic!(
                "command did not emit valid JSON\nargs: {:?}\nerror: {}\nstdout:\n{}",
                args, err, stdout
            )
        })
    }

    fn column(&self, uuid: &str, column: &str) -> rusqlite::types::Value {
        let conn = Connection::open(&self.db_path).expect("open database");
        conn.query_row(
            &format!("SELECT {column} FROM TMTask WHERE uuid = ?"),
            [uuid],
            |row| row.get(0),
        )
        .expect("read column")
    }
}

fn create_database(path: &Path) {
    let conn = Connection::open(path).expect("failed to create database");
    conn.execute_batch(SCHEMA).expect("failed to create schema");
    conn.execute_batch(
        "INSERT INTO TMArea (uuid, title) VALUES ('A-HOME', 'Home');
         INSERT INTO TMTag (uuid, title) VALUES ('G-ERR', 'errand');",
    )
    .expect("insert area and tag");

    let rows: [(&str, i64, &str, i64, i64, Option<&str>, Option<&str>, Option<&str>); 5] = [
        ("P-GARDEN", 1, "Garden", 1, 0, None, Some("A-HOME"), None),
        ("T-SEEDS", 0, "Buy seeds", 10, 0, Some("P-GARDEN"), None, None),
        ("T-LAMP", 0, "Fix lamp", 12, 0, None, Some("A-HOME"), Some("manual: https://example.com")),
        ("T-DONE", 0, "Call plumber", 13, 3, None, None, None),
        ("T-MILK", 0, "buy milk", 16, 0, None, None, None),
    ];
    for (uuid, kind, title, index, status, project, area, notes) in rows {
        conn.execute(
            "INSERT INTO TMTask (uuid, type, title, \"index\", status, project, area, notes, \
             creationDate, userModificationDate) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![uuid, kind, title, index, status, project, area, notes, CREATED, CREATED],
        )
        .expect("insert task");
    }
    conn.execute_batch(
        "INSERT INTO TMTaskTag (tasks, tags) VALUES ('T-SEEDS', 'G-ERR'), ('T-MILK', 'G-ERR');",
    )
    .expect("insert task tags");
}

fn ids(value: &Value) -> Vec<String> {
    value["tasks"]
        .as_array()
        .expect("tasks array")
        .iter()
        .map(|t| t["uuid"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_listing_formats_and_filters() {
    let ctx = CliE2eContext::new();

    let all = ctx.run_json(&["todos", "--json"]);
    assert_eq!(ids(&all), vec!["T-SEEDS", "T-LAMP", "T-MILK"]);
    assert_eq!(all["count"], 3);
    assert_eq!(all["tasks"][0]["project_title"], "Garden");

    let table = ctx.run_stdout(&["ls"]);
    assert!(table.starts_with("ID"));
    assert!(table.contains("Buy seeds"));
    assert!(!table.contains("Call plumber"));

    let csv = ctx.run_stdout(&["todos", "--tag", "errand", "--format", "csv"]);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("id,kind,status,title"));
    assert!(lines[1].starts_with("T-SEEDS,to-do,incomplete,Buy seeds,Garden"));
    assert!(lines[2].starts_with("T-MILK,"));

    let done = ctx.run_json(&["todos", "--status", "completed", "--json"]);
    assert_eq!(ids(&done), vec!["T-DONE"]);
}

#[test]
fn test_rich_query_sort_and_pagination() {
    let ctx = CliE2eContext::new();

    let found = ctx.run_json(&["todos", "--json", "--query", "url:true OR title:/^buy/i"]);
    assert_eq!(ids(&found), vec!["T-SEEDS", "T-LAMP", "T-MILK"]);

    let page = ctx.run_json(&[
        "todos", "--json", "--query", "tag:errand", "--sort", "title", "--offset", "1",
        "--limit", "1",
    ]);
    assert_eq!(ids(&page), vec!["T-SEEDS"]);

    let negated = ctx.run_json(&["todos", "--json", "-Q", "NOT (tag:errand OR area:home)"]);
    assert!(ids(&negated).is_empty());
}

#[test]
fn test_sidebar_list_commands() {
    let ctx = CliE2eContext::new();

    let anytime = ctx.run_json(&["anytime", "--json"]);
    assert_eq!(ids(&anytime), vec!["T-SEEDS", "T-LAMP", "T-MILK"]);

    let errands = ctx.run_json(&["anytime", "--json", "--tag", "errand", "-n", "1"]);
    assert_eq!(ids(&errands), vec!["T-SEEDS"]);

    assert!(ids(&ctx.run_json(&["inbox", "--json"])).is_empty());
    assert!(ids(&ctx.run_json(&["today", "--json"])).is_empty());
    assert!(ids(&ctx.run_json(&["trash", "--json"])).is_empty());

    assert_eq!(ids(&ctx.run_json(&["logbook", "--json"])), vec!["T-DONE"]);
    assert_eq!(ids(&ctx.run_json(&["completed", "--json"])), vec!["T-DONE"]);
    assert!(ids(&ctx.run_json(&["canceled", "--json"])).is_empty());

    let projects = ctx.run_json(&["anytime", "--json", "--kind", "project"]);
    assert_eq!(ids(&projects), vec!["P-GARDEN"]);
}

#[test]
fn test_errors_are_reported_with_exit_codes() {
    let ctx = CliE2eContext::new();

    let output = ctx.run_allow_failure(&["todos", "--project", "Gardn"]);
    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Error: project not found: Gardn (did you mean 'Garden'?)"),
        "{stderr}"
    );

    let output = ctx.run_allow_failure(&["todos", "--json", "--query", "title:\"open"]);
    assert_eq!(output.status.code(), Some(1));
    let envelope: Value = serde_json::from_slice(&output.stderr).expect("error envelope");
    assert_eq!(envelope["error"]["code"], "QUERY_ERROR");
    assert_eq!(
        envelope["error"]["message"],
        "query error: unterminated string starting at 7"
    );

    let output = ctx.run_allow_failure(&["todos", "--sort", "titel"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid sort field"));
}

#[test]
fn test_missing_database_fails() {
    let ctx = CliE2eContext::new();
    let missing = ctx.sandbox.path().join("nope.sqlite");

    let output = ctx
        .command(&["todos", "--db", missing.to_str().expect("utf-8 path")])
        .output()
        .expect("run things");

    assert_eq!(output.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&output.stderr).contains("database not found"));
}

#[test]
fn test_repeat_set_and_clear() {
    let ctx = CliE2eContext::new();

    let result = ctx.run_json(&[
        "repeat", "T-LAMP", "--every", "2", "--unit", "week", "--mode", "schedule", "--start",
        "2026-01-06", "--json",
    ]);
    assert_eq!(result["id"], "T-LAMP");
    assert_eq!(result["action"], "set");
    assert_eq!(result["rule"]["instance_creation_start_date"], "2026-01-07");
    assert_eq!(result["rule"]["next_instance_start_date"], "2026-01-20");
    assert!(matches!(
        ctx.column("T-LAMP", "rt1_recurrenceRule"),
        rusqlite::types::Value::Blob(_)
    ));
    assert_eq!(
        ctx.column("T-LAMP", "start"),
        rusqlite::types::Value::Integer(2)
    );

    let listed = ctx.run_json(&["todos", "--json", "--repeating-only"]);
    assert_eq!(ids(&listed), vec!["T-LAMP"]);

    let text = ctx.run_stdout(&["repeat", "T-LAMP", "--clear"]);
    assert_eq!(text, "Repeat cleared on T-LAMP\n");
    assert_eq!(
        ctx.column("T-LAMP", "rt1_recurrenceRule"),
        rusqlite::types::Value::Null
    );
}

#[test]
fn test_repeat_dry_run_leaves_database_alone() {
    let ctx = CliE2eContext::new();

    let text = ctx.run_stdout(&["repeat", "T-SEEDS", "--unit", "day", "--dry-run"]);
    assert!(text.starts_with("Would set repeat on T-SEEDS\n  every 1 day, after-completion\n"));
    assert_eq!(
        ctx.column("T-SEEDS", "rt1_recurrenceRule"),
        rusqlite::types::Value::Null
    );
}

#[test]
fn test_repeat_rejects_bad_targets_and_specs() {
    let ctx = CliE2eContext::new();

    let output = ctx.run_allow_failure(&["repeat", "T-DONE", "--unit", "week"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr)
        .contains("repeating rules require an incomplete item"));

    let output = ctx.run_allow_failure(&[
        "repeat", "T-LAMP", "--unit", "week", "--start", "2026-03-01", "--until", "2026-02-01",
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr)
        .contains("repeat end date must be on or after the start date"));

    let output = ctx.run_allow_failure(&["repeat", "P-GARDEN", "--unit", "week"]);
    assert_eq!(output.status.code(), Some(4));
    ctx.run(&["repeat", "P-GARDEN", "--unit", "week", "--project"]);
}

#[test]
fn test_repeat_waits_for_item_by_title() {
    let ctx = CliE2eContext::new();

    let result = ctx.run_json(&[
        "repeat", "--title", "buy milk", "--since", "0", "--timeout", "0", "--unit", "day",
        "--json",
    ]);
    assert_eq!(result["id"], "T-MILK");

    let output = ctx.run_allow_failure(&[
        "repeat", "--title", "never created", "--timeout", "0", "--unit", "day", "--json",
    ]);
    assert_eq!(output.status.code(), Some(2));
    let envelope: Value = serde_json::from_slice(&output.stderr).expect("error envelope");
    assert_eq!(envelope["error"]["code"], "TIMEOUT");
}

#[test]
fn test_config_workflow() {
    let ctx = CliE2eContext::new();

    let path = ctx.run_stdout(&["config", "path"]);
    assert_eq!(path.trim(), ctx.config_path.display().to_string());

    ctx.run(&["config", "init"]);
    assert!(ctx.config_path.exists());
    let output = ctx.run_allow_failure(&["config", "init"]);
    assert_eq!(output.status.code(), Some(5));
    ctx.run(&["config", "init", "--force"]);

    let db = ctx.db_path.to_str().expect("utf-8 path");
    ctx.run(&["config", "set", "database", db]);
    ctx.run(&["config", "set", "output.format", "csv"]);
    ctx.run(&["config", "set", "query.default_limit", "1"]);

    // No THINGSDB: the database comes from the config file.
    let output = ctx.command(&["todos"]).output().expect("run things");
    assert!(output.status.success());
    let csv = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("T-SEEDS,"));

    let shown = ctx.run_json(&["config", "show", "--json"]);
    assert_eq!(shown["exists"], true);
    assert_eq!(shown["config"]["output"]["format"], "csv");
    assert_eq!(shown["config"]["query"]["default_limit"], 1);

    fs::write(&ctx.config_path, "version = [").expect("write broken config");
    let output = ctx.run_allow_failure(&["todos"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to parse config"));
    ctx.run(&["config", "path"]);
}

#[test]
fn test_completions() {
    let ctx = CliE2eContext::new();
    let script = ctx.run_stdout(&["completions", "bash"]);
    assert!(script.contains("things"));
}
