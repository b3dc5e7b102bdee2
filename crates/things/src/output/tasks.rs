//! Task output formatting.

use chrono::NaiveDate;
use owo_colors::OwoColorize;
use serde::Serialize;
use things_db::repeat::ResolvedTarget;
use things_db::RepeatMode;
use things_model::{RepeatUpdate, Task, ThingsDate};

use super::helpers::{csv_field, format_deadline, format_tags, format_title, truncate_str};

/// Column headers of the CSV listing.
const CSV_HEADER: [&str; 14] = [
    "id",
    "kind",
    "status",
    "title",
    "project",
    "area",
    "heading",
    "deadline",
    "start_date",
    "tags",
    "repeating",
    "trashed",
    "created",
    "modified",
];

/// JSON output structure for the todos command.
#[derive(Serialize)]
pub struct ListOutput<'a> {
    pub tasks: &'a [Task],
    pub count: usize,
}

/// JSON output structure for a repeat change.
#[derive(Serialize)]
pub struct RepeatOutput<'a> {
    pub id: &'a str,
    pub used_template: bool,
    pub action: &'a str,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<RuleOutput>,
}

/// The parts of a built rule worth showing.
#[derive(Serialize)]
pub struct RuleOutput {
    pub mode: &'static str,
    pub every: i64,
    pub unit: &'static str,
    pub instance_creation_start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_instance_start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

impl RuleOutput {
    pub fn new(mode: RepeatMode, every: i64, unit: &'static str, update: &RepeatUpdate) -> Self {
        Self {
            mode: mode.label(),
            every,
            unit,
            instance_creation_start_date: update.instance_creation_start_date.to_string(),
            next_instance_start_date: update.next_instance_start_date.map(|d| d.to_string()),
            deadline: update
                .set_deadline
                .then(|| update.deadline.map(|d| d.to_string()))
                .flatten(),
        }
    }
}

/// Formats tasks as JSON.
pub fn format_tasks_json(tasks: &[Task]) -> Result<String, serde_json::Error> {
    let output = ListOutput {
        tasks,
        count: tasks.len(),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats tasks as CSV with a header row.
pub fn format_tasks_csv(tasks: &[Task]) -> String {
    let mut output = CSV_HEADER.join(",");
    output.push('\n');

    for task in tasks {
        let date = |d: Option<ThingsDate>| d.map(|d| d.to_string()).unwrap_or_default();
        let time = |t: Option<chrono::DateTime<chrono::Utc>>| {
            t.map(|t| t.to_rfc3339()).unwrap_or_default()
        };
        let fields = [
            task.uuid.clone(),
            task.kind.label().to_string(),
            task.status.label().to_string(),
            task.title.clone(),
            task.project_title_str().to_string(),
            task.area_title_str().to_string(),
            task.heading_title_str().to_string(),
            date(task.deadline),
            date(task.start_date),
            task.tags.join(";"),
            task.repeating.to_string(),
            task.trashed.to_string(),
            time(task.created),
            time(task.modified),
        ];
        let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        output.push_str(&row.join(","));
        output.push('\n');
    }

    output
}

/// Formats tasks as a table.
pub fn format_tasks_table(tasks: &[Task], today: NaiveDate, use_colors: bool) -> String {
    if tasks.is_empty() {
        return "No tasks found.\n".to_string();
    }

    let id_width = tasks
        .iter()
        .map(|t| t.uuid.chars().count())
        .max()
        .unwrap_or(2)
        .max(2);

    let mut output = String::new();

    let header = format!(
        "{:<id_width$} {:<12} {:<18} {:<15} {}",
        "ID", "Deadline", "Project", "Tags", "Title"
    );
    if use_colors {
        output.push_str(&format!("{}\n", header.dimmed()));
    } else {
        output.push_str(&header);
        output.push('\n');
    }

    for task in tasks {
        let deadline = format_deadline(task.deadline, today, 12, use_colors);
        let parent = task
            .project_title
            .as_deref()
            .or(task.area_title.as_deref())
            .map(|p| truncate_str(p, 18))
            .unwrap_or_default();
        let tags = format_tags(&task.tags, 15);
        let mut title = format_title(&task.title, task.status, use_colors);
        if task.repeating {
            title.push_str(" ↻");
        }

        let line = format!(
            "{:<id_width$} {} {:<18} {:<15} {}",
            task.uuid, deadline, parent, tags, title
        );
        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Formats the result of a repeat change as JSON.
pub fn format_repeat_json(
    target: &ResolvedTarget,
    rule: Option<RuleOutput>,
    dry_run: bool,
) -> Result<String, serde_json::Error> {
    let output = RepeatOutput {
        id: &target.id,
        used_template: target.used_template,
        action: if rule.is_some() { "set" } else { "clear" },
        dry_run,
        rule,
    };
    serde_json::to_string_pretty(&output)
}

/// Formats the result of a repeat change as text.
pub fn format_repeat_text(
    target: &ResolvedTarget,
    rule: Option<&RuleOutput>,
    dry_run: bool,
    use_colors: bool,
) -> String {
    let mut output = String::new();
    let verb = match (rule.is_some(), dry_run) {
        (true, false) => "Repeat set on",
        (true, true) => "Would set repeat on",
        (false, false) => "Repeat cleared on",
        (false, true) => "Would clear repeat on",
    };
    let id = if use_colors {
        target.id.cyan().to_string()
    } else {
        target.id.clone()
    };
    output.push_str(&format!("{verb} {id}"));
    if target.used_template {
        output.push_str(" (repeating template)");
    }
    output.push('\n');

    if let Some(rule) = rule {
        let plural = if rule.every == 1 { "" } else { "s" };
        output.push_str(&format!(
            "  every {} {}{plural}, {}\n",
            rule.every, rule.unit, rule.mode
        ));
        output.push_str(&format!("  starts {}\n", rule.instance_creation_start_date));
        if let Some(ref next) = rule.next_instance_start_date {
            output.push_str(&format!("  next   {next}\n"));
        }
        if let Some(ref deadline) = rule.deadline {
            output.push_str(&format!("  deadline {deadline}\n"));
        }
    }

    output
}
