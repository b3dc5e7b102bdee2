//! Rich query evaluation against task records.
//!
//! This module provides the [`QueryEvaluator`] for applying a parsed
//! [`Query`] to [`Task`] rows already loaded from the database.
//!
//! # Example
//!
//! ```
//! use things_db::query::{QueryEvaluator, QueryParser};
//! use things_model::Task;
//!
//! let query = QueryParser::parse("title:/^alph/i").unwrap().unwrap();
//! let evaluator = QueryEvaluator::new(&query);
//!
//! assert!(evaluator.matches(&Task::new("1", "Alpha")));
//! assert!(!evaluator.matches(&Task::new("2", "beta")));
//! ```

use things_model::Task;

use super::ast::{Field, Matcher, Predicate, Query};

/// Evaluates a parsed query against tasks.
///
/// Evaluation is pure: the same task always gives the same answer, and
/// boolean nodes short-circuit.
#[derive(Debug)]
pub struct QueryEvaluator<'a> {
    query: &'a Query,
}

impl<'a> QueryEvaluator<'a> {
    /// Creates a new query evaluator.
    pub fn new(query: &'a Query) -> Self {
        Self { query }
    }

    /// Returns true if the task matches the query.
    pub fn matches(&self, task: &Task) -> bool {
        evaluate(self.query, task)
    }

    /// Filters a slice of tasks, keeping their order.
    pub fn filter_tasks<'b>(&self, tasks: &'b [Task]) -> Vec<&'b Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }
}

/// Keeps the tasks that match `query`, in their original order.
///
/// With no query every task is kept.
pub fn filter_tasks(tasks: Vec<Task>, query: Option<&Query>) -> Vec<Task> {
    match query {
        Some(query) => tasks.into_iter().filter(|t| evaluate(query, t)).collect(),
        None => tasks,
    }
}

fn evaluate(query: &Query, task: &Task) -> bool {
    match query {
        Query::And(left, right) => evaluate(left, task) && evaluate(right, task),
        Query::Or(left, right) => evaluate(left, task) || evaluate(right, task),
        Query::Not(inner) => !evaluate(inner, task),
        Query::Predicate(predicate) => matches_predicate(predicate, task),
    }
}

fn matches_predicate(predicate: &Predicate, task: &Task) -> bool {
    let m = &predicate.matcher;
    match &predicate.field {
        None => {
            m.is_match(&task.title)
                || m.is_match(&task.notes)
                || any_tag(m, task)
                || m.is_match(task.project_title_str())
                || m.is_match(task.area_title_str())
                || m.is_match(task.heading_title_str())
        }
        Some(Field::Title) => m.is_match(&task.title),
        Some(Field::Notes) => m.is_match(&task.notes),
        Some(Field::Tag) => any_tag(m, task),
        Some(Field::Project) => m.is_match(task.project_title_str()),
        Some(Field::Area) => m.is_match(task.area_title_str()),
        Some(Field::Heading) => m.is_match(task.heading_title_str()),
        Some(Field::Id) => m.is_match(&task.uuid),
        Some(Field::Url) => matches_url(m, &task.notes),
        Some(Field::Repeating) => matches_flag(m, task.repeating),
        Some(Field::Unknown(_)) => false,
    }
}

fn any_tag(m: &Matcher, task: &Task) -> bool {
    task.tags.iter().any(|tag| m.is_match(tag))
}

/// Returns true if the notes contain an `http://` or `https://` link.
fn notes_have_url(notes: &str) -> bool {
    let lower = notes.to_lowercase();
    lower.contains("http://") || lower.contains("https://")
}

fn matches_url(m: &Matcher, notes: &str) -> bool {
    match m {
        Matcher::Contains(value) => match value.trim() {
            "true" => notes_have_url(notes),
            "false" => !notes_have_url(notes),
            _ => m.is_match(notes),
        },
        Matcher::Regex(_) => m.is_match(notes),
    }
}

fn matches_flag(m: &Matcher, flag: bool) -> bool {
    let text = if flag { "true" } else { "false" };
    match m {
        Matcher::Contains(value) => match value.trim() {
            "true" => flag,
            "false" => !flag,
            other => text.contains(other),
        },
        Matcher::Regex(_) => m.is_match(text),
    }
}
