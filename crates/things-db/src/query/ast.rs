//! Abstract Syntax Tree (AST) for rich queries.

use std::fmt;

use regex::Regex;

/// A parsed rich query.
///
/// Queries are immutable once parsed and carry no evaluation state, so one
/// parsed query can be applied to any number of tasks.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Both sides must match.
    And(Box<Query>, Box<Query>),

    /// Either side must match.
    Or(Box<Query>, Box<Query>),

    /// The inner query must not match.
    Not(Box<Query>),

    /// A single `[field:]value` test.
    Predicate(Predicate),
}

impl Query {
    /// Creates an AND node.
    ///
    /// # Example
    ///
    /// ```
    /// use things_db::query::{Matcher, Query};
    ///
    /// let q = Query::and(
    ///     Query::predicate(None, Matcher::contains("milk")),
    ///     Query::predicate(None, Matcher::contains("eggs")),
    /// );
    /// assert!(matches!(q, Query::And(_, _)));
    /// ```
    pub fn and(left: Query, right: Query) -> Self {
        Query::And(Box::new(left), Box::new(right))
    }

    /// Creates an OR node.
    pub fn or(left: Query, right: Query) -> Self {
        Query::Or(Box::new(left), Box::new(right))
    }

    /// Creates a NOT node.
    pub fn negate(inner: Query) -> Self {
        Query::Not(Box::new(inner))
    }

    /// Creates a predicate leaf.
    pub fn predicate(field: Option<Field>, matcher: Matcher) -> Self {
        Query::Predicate(Predicate { field, matcher })
    }
}

/// A `[field:]value` test.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// The scoped field, or `None` for an unscoped search.
    pub field: Option<Field>,
    /// How the value is compared.
    pub matcher: Matcher,
}

/// Task attribute a predicate is scoped to.
///
/// Field names are case-insensitive. Names that are not recognised are kept
/// as [`Field::Unknown`] and never match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Title,
    Notes,
    /// `tag` or `tags`: matches if any tag matches.
    Tag,
    Project,
    Area,
    Heading,
    /// `id` or `uuid`.
    Id,
    /// `url:true|false` checks notes for links, other values match notes.
    Url,
    /// `repeating:true|false` checks the recurrence flag.
    Repeating,
    Unknown(String),
}

impl Field {
    /// Maps a field name as written in a query.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "title" => Field::Title,
            "notes" => Field::Notes,
            "tag" | "tags" => Field::Tag,
            "project" => Field::Project,
            "area" => Field::Area,
            "heading" => Field::Heading,
            "id" | "uuid" => Field::Id,
            "url" => Field::Url,
            "repeating" => Field::Repeating,
            _ => Field::Unknown(name.to_string()),
        }
    }
}

/// How a predicate value is compared against a string attribute.
#[derive(Clone)]
pub enum Matcher {
    /// Case-insensitive substring match. The needle is stored lowercased.
    Contains(String),
    /// Regular expression match.
    Regex(Regex),
}

impl Matcher {
    /// Creates a substring matcher, lowercasing the needle.
    pub fn contains(value: &str) -> Self {
        Matcher::Contains(value.to_lowercase())
    }

    /// Returns true if `input` matches.
    pub fn is_match(&self, input: &str) -> bool {
        match self {
            Matcher::Contains(needle) => input.to_lowercase().contains(needle.as_str()),
            Matcher::Regex(re) => re.is_match(input),
        }
    }
}

impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Matcher::Contains(a), Matcher::Contains(b)) => a == b,
            (Matcher::Regex(a), Matcher::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Contains(needle) => f.debug_tuple("Contains").field(needle).finish(),
            Matcher::Regex(re) => f.debug_tuple("Regex").field(&re.as_str()).finish(),
        }
    }
}
