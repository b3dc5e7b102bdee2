//! Output formatting utilities for the things CLI.
//!
//! - [`tasks`] - Task listings (table, JSON, CSV) and repeat results
//! - [`helpers`] - Common formatting utilities (truncation, deadlines, CSV quoting)

pub mod helpers;
mod tasks;

pub use tasks::{
    format_repeat_json, format_repeat_text, format_tasks_csv, format_tasks_json,
    format_tasks_table, RuleOutput,
};
