//! Error types for the rich query parser.

use thiserror::Error;

/// A specialized Result type for rich query parsing.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur while tokenizing or parsing a rich query.
///
/// Every variant carries the fragment of the input that caused it so the CLI
/// can print a useful message without re-scanning the query.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// A quoted string was opened but never closed.
    #[error("unterminated string starting at {position}")]
    UnterminatedString {
        /// Byte offset just after the opening quote.
        position: usize,
    },

    /// A `/pattern/` literal was opened but never closed.
    #[error("unterminated regex")]
    UnterminatedRegex,

    /// A character that cannot start any token.
    #[error("unexpected character {character:?}")]
    UnexpectedCharacter {
        /// The offending character.
        character: char,
    },

    /// Input remained after a complete expression was parsed.
    #[error("unexpected token {token:?}")]
    UnexpectedToken {
        /// Source text of the token.
        token: String,
    },

    /// A parenthesised group was not closed.
    #[error("expected ')'")]
    UnclosedParenthesis,

    /// A `field:` prefix (or an operator) was not followed by a value.
    #[error("expected value after {field:?}")]
    ExpectedValue {
        /// The field name, empty when no field was given.
        field: String,
    },

    /// A `/pattern/` literal did not compile.
    #[error("invalid regex {pattern:?}: {reason}")]
    InvalidRegex {
        /// The pattern as written, without flags.
        pattern: String,
        /// Compiler diagnostic.
        reason: String,
    },
}

impl QueryError {
    /// Creates an unexpected token error.
    pub fn unexpected_token(token: impl Into<String>) -> Self {
        QueryError::UnexpectedToken {
            token: token.into(),
        }
    }

    /// Creates a missing value error.
    pub fn expected_value(field: impl Into<String>) -> Self {
        QueryError::ExpectedValue {
            field: field.into(),
        }
    }
}
