//! Rich query language for filtering tasks in memory.
//!
//! Queries are parsed once and then evaluated against each task record that
//! the database returned.
//!
//! # Supported Syntax
//!
//! ## Predicates
//! - `milk` - title, notes, tags, project, area or heading contains "milk"
//! - `title:milk` - scoped to one field (`title`, `notes`, `tag`/`tags`,
//!   `project`, `area`, `heading`, `id`/`uuid`)
//! - `"two words"` or `'two words'` - quoted values, `\` escapes
//! - `/^alph/i` - regular expressions, flags `i` and `m`
//! - `url:true`, `url:false` - notes contain (or lack) an http(s) link
//! - `repeating:true`, `repeating:false` - recurrence flag
//!
//! Plain values match case-insensitively as substrings. Unknown fields never
//! match.
//!
//! ## Boolean Operators
//! - `and`, `&&`, or plain adjacency - AND
//! - `or`, `||` - OR
//! - `not`, `!` - NOT
//! - `()` - Grouping
//!
//! # Example
//!
//! ```
//! use things_db::query::{filter_tasks, parse_rich_query};
//! use things_model::Task;
//!
//! let mut errand = Task::new("1", "Buy milk");
//! errand.tags = vec!["errand".to_string()];
//! let chore = Task::new("2", "Clean desk");
//!
//! let query = parse_rich_query("milk tag:errand").unwrap();
//! let kept = filter_tasks(vec![errand, chore], query.as_ref());
//! assert_eq!(kept.len(), 1);
//! assert_eq!(kept[0].uuid, "1");
//! ```

mod ast;
mod error;
mod evaluator;
mod lexer;
mod parser;

pub use ast::{Field, Matcher, Predicate, Query};
pub use error::{QueryError, QueryResult};
pub use evaluator::{filter_tasks, QueryEvaluator};
pub use lexer::{Lexer, PositionedToken, QueryToken};
pub use parser::QueryParser;

/// Parses a rich query string, returning `None` for blank input.
pub fn parse_rich_query(input: &str) -> QueryResult<Option<Query>> {
    QueryParser::parse(input)
}
