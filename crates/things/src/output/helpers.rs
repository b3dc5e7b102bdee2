//! Common helper functions for output formatting.

use chrono::{Local, NaiveDate};
use owo_colors::OwoColorize;
use things_model::{TaskStatus, ThingsDate};

/// Truncates a string to a maximum number of characters.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// Today's date in local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Formats a deadline relative to `today`, padded to `width`.
pub fn format_deadline(
    deadline: Option<ThingsDate>,
    today: NaiveDate,
    width: usize,
    use_colors: bool,
) -> String {
    let Some(date) = deadline
        .filter(|d| *d != ThingsDate::far_future())
        .and_then(ThingsDate::to_naive)
    else {
        return format!("{:<width$}", "");
    };

    let tomorrow = today + chrono::Duration::days(1);
    let display = if date == today {
        "Today".to_string()
    } else if date == tomorrow {
        "Tomorrow".to_string()
    } else if date < today {
        let days = (today - date).num_days();
        if days == 1 {
            "1 day ago".to_string()
        } else {
            format!("{days} days ago")
        }
    } else {
        date.format("%b %d").to_string()
    };
    let padded = format!("{display:<width$}");

    if !use_colors {
        padded
    } else if date < today {
        padded.red().to_string()
    } else if date == today {
        padded.yellow().to_string()
    } else {
        padded
    }
}

/// Formats tags for display.
pub fn format_tags(tags: &[String], max_len: usize) -> String {
    if tags.is_empty() {
        return String::new();
    }

    let formatted: Vec<String> = tags.iter().map(|t| format!("#{t}")).collect();
    truncate_str(&formatted.join(" "), max_len)
}

/// Marks finished items in the title column.
pub fn format_title(title: &str, status: TaskStatus, use_colors: bool) -> String {
    match status {
        TaskStatus::Incomplete => title.to_string(),
        TaskStatus::Completed if use_colors => format!("{} {}", "✓".green(), title.dimmed()),
        TaskStatus::Completed => format!("✓ {title}"),
        TaskStatus::Canceled if use_colors => format!("{} {}", "×".red(), title.dimmed()),
        TaskStatus::Canceled => format!("× {title}"),
    }
}

/// Quotes a CSV field when it contains a separator, quote or line break.
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
