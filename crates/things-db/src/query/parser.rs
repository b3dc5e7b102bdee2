//! Recursive descent parser for rich queries.

use regex::Regex;

use super::ast::{Field, Matcher, Query};
use super::error::{QueryError, QueryResult};
use super::lexer::{Lexer, PositionedToken, QueryToken};

/// Parser for rich query strings.
///
/// # Grammar
///
/// ```text
/// expression ::= or_expr
/// or_expr    ::= and_expr (OR and_expr)*
/// and_expr   ::= unary_expr (AND unary_expr | unary_expr)*
/// unary_expr ::= NOT unary_expr | primary
/// primary    ::= "(" expression ")" | predicate
/// predicate  ::= [ident ":"] value
/// value      ::= ident | string | regex
/// ```
///
/// # Operator Precedence (highest to lowest)
///
/// 1. `NOT` / `!` - unary
/// 2. `AND` / `&&` / adjacency - binary, left-associative
/// 3. `OR` / `||` - binary, left-associative
///
/// # Example
///
/// ```
/// use things_db::query::{Query, QueryParser};
///
/// let query = QueryParser::parse("title:milk or tag:errand").unwrap().unwrap();
/// assert!(matches!(query, Query::Or(_, _)));
///
/// // Blank input means "no query".
/// assert!(QueryParser::parse("   ").unwrap().is_none());
/// ```
pub struct QueryParser {
    tokens: Vec<PositionedToken>,
    position: usize,
}

impl QueryParser {
    /// Parses a rich query string.
    ///
    /// Returns `Ok(None)` for blank input.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] describing the first lexical or syntactic
    /// problem, including invalid regular expressions.
    pub fn parse(input: &str) -> QueryResult<Option<Query>> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let tokens = Lexer::new(trimmed).tokenize()?;
        let mut parser = Self {
            tokens,
            position: 0,
        };
        let query = parser.parse_expression()?;

        if let Some(remaining) = parser.peek() {
            return Err(QueryError::unexpected_token(remaining.text()));
        }

        Ok(Some(query))
    }

    fn peek(&self) -> Option<&QueryToken> {
        self.tokens.get(self.position).map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<QueryToken> {
        let token = self.tokens.get(self.position).map(|t| t.token.clone());
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn eat_and(&mut self) -> bool {
        if matches!(self.peek(), Some(QueryToken::And(_))) {
            self.position += 1;
            return true;
        }
        false
    }

    fn eat_or(&mut self) -> bool {
        if matches!(self.peek(), Some(QueryToken::Or(_))) {
            self.position += 1;
            return true;
        }
        false
    }

    fn parse_expression(&mut self) -> QueryResult<Query> {
        self.parse_or_expr()
    }

    fn parse_or_expr(&mut self) -> QueryResult<Query> {
        let mut left = self.parse_and_expr()?;

        while self.eat_or() {
            let right = self.parse_and_expr()?;
            left = Query::or(left, right);
        }

        Ok(left)
    }

    /// Explicit `AND` or plain adjacency both join with AND.
    fn parse_and_expr(&mut self) -> QueryResult<Query> {
        let mut left = self.parse_unary_expr()?;

        loop {
            let joined = self.eat_and() || self.peek().is_some_and(QueryToken::starts_primary);
            if !joined {
                break;
            }
            let right = self.parse_unary_expr()?;
            left = Query::and(left, right);
        }

        Ok(left)
    }

    fn parse_unary_expr(&mut self) -> QueryResult<Query> {
        if matches!(self.peek(), Some(QueryToken::Not(_))) {
            self.advance();
            let inner = self.parse_unary_expr()?;
            return Ok(Query::negate(inner));
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> QueryResult<Query> {
        if matches!(self.peek(), Some(QueryToken::OpenParen)) {
            self.advance();
            let inner = self.parse_expression()?;
            if !matches!(self.peek(), Some(QueryToken::CloseParen)) {
                return Err(QueryError::UnclosedParenthesis);
            }
            self.advance();
            return Ok(inner);
        }

        self.parse_predicate()
    }

    fn parse_predicate(&mut self) -> QueryResult<Query> {
        let mut field_name = String::new();
        let mut value = self.advance();

        if let Some(QueryToken::Ident(name)) = &value {
            if matches!(self.peek(), Some(QueryToken::Colon)) {
                field_name = name.clone();
                self.advance(); // consume ':'
                value = self.advance();
            }
        }

        let matcher = match value {
            Some(QueryToken::Ident(text)) | Some(QueryToken::Str(text)) => {
                Matcher::contains(&text)
            }
            Some(QueryToken::Regex { pattern, flags }) => compile_regex(&pattern, &flags)?,
            _ => return Err(QueryError::expected_value(field_name)),
        };

        let field = if field_name.is_empty() {
            None
        } else {
            Some(Field::from_name(&field_name))
        };
        Ok(Query::predicate(field, matcher))
    }
}

/// Compiles a `/pattern/flags` literal. `i` and `m` become inline flags.
fn compile_regex(pattern: &str, flags: &str) -> QueryResult<Matcher> {
    let mut inline = String::new();
    if flags.contains('i') {
        inline.push('i');
    }
    if flags.contains('m') {
        inline.push('m');
    }
    let source = if inline.is_empty() {
        pattern.to_string()
    } else {
        format!("(?{inline}){pattern}")
    };

    Regex::new(&source)
        .map(Matcher::Regex)
        .map_err(|e| QueryError::InvalidRegex {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}
