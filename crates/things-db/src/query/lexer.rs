//! Lexer (tokenizer) for rich queries.

use super::error::{QueryError, QueryResult};

/// A token with its position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedToken {
    /// The token.
    pub token: QueryToken,
    /// The byte position where the token starts (0-indexed).
    pub position: usize,
}

/// A token in a rich query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryToken {
    /// A bare word.
    Ident(String),

    /// A quoted string with escapes resolved.
    Str(String),

    /// A `/pattern/flags` literal. Escapes are kept in `pattern`.
    Regex { pattern: String, flags: String },

    /// `and` or `&&`.
    And(String),

    /// `or` or `||`.
    Or(String),

    /// `not` or `!`.
    Not(String),

    /// Opening parenthesis `(`.
    OpenParen,

    /// Closing parenthesis `)`.
    CloseParen,

    /// Field separator `:`.
    Colon,
}

impl QueryToken {
    /// Source-like text for error messages.
    pub fn text(&self) -> String {
        match self {
            QueryToken::Ident(s) | QueryToken::Str(s) => s.clone(),
            QueryToken::Regex { pattern, flags } => format!("/{pattern}/{flags}"),
            QueryToken::And(s) | QueryToken::Or(s) | QueryToken::Not(s) => s.clone(),
            QueryToken::OpenParen => "(".to_string(),
            QueryToken::CloseParen => ")".to_string(),
            QueryToken::Colon => ":".to_string(),
        }
    }

    /// Returns true for tokens that can begin a primary expression.
    ///
    /// Two primaries next to each other are joined with an implicit AND.
    pub fn starts_primary(&self) -> bool {
        matches!(
            self,
            QueryToken::Ident(_)
                | QueryToken::Str(_)
                | QueryToken::Regex { .. }
                | QueryToken::OpenParen
                | QueryToken::Not(_)
        )
    }
}

/// Lexer for tokenizing rich queries.
pub struct Lexer<'a> {
    input: &'a str,
    /// Current byte position in the input string.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Tokenizes the whole input.
    ///
    /// Unlike a permissive lexer this stops at the first error: an
    /// unterminated string or regex makes the rest of the input meaningless.
    pub fn tokenize(mut self) -> QueryResult<Vec<PositionedToken>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if matches!(c, ' ' | '\t' | '\n' | '\r') {
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn is_delimiter(c: char) -> bool {
        matches!(c, ' ' | '\t' | '\n' | '\r' | '(' | ')' | ':')
    }

    /// Returns the next token, `None` at end of input.
    pub fn next_token(&mut self) -> QueryResult<Option<PositionedToken>> {
        self.skip_whitespace();

        let Some(c) = self.peek() else {
            return Ok(None);
        };
        let start = self.position;
        let single = |token| Ok(Some(PositionedToken { token, position: start }));

        match c {
            '(' => {
                self.next_char();
                return single(QueryToken::OpenParen);
            }
            ')' => {
                self.next_char();
                return single(QueryToken::CloseParen);
            }
            ':' => {
                self.next_char();
                return single(QueryToken::Colon);
            }
            '!' => {
                self.next_char();
                return single(QueryToken::Not("!".to_string()));
            }
            '"' | '\'' => {
                let value = self.read_quoted_string(c)?;
                return single(QueryToken::Str(value));
            }
            '/' => {
                let (pattern, flags) = self.read_regex()?;
                return single(QueryToken::Regex { pattern, flags });
            }
            '&' if self.peek_second() == Some('&') => {
                self.position += 2;
                return single(QueryToken::And("&&".to_string()));
            }
            '|' if self.peek_second() == Some('|') => {
                self.position += 2;
                return single(QueryToken::Or("||".to_string()));
            }
            _ => {}
        }

        let word = self.read_word();
        if word.is_empty() {
            return Err(QueryError::UnexpectedCharacter { character: c });
        }
        let token = match word.to_lowercase().as_str() {
            "and" => QueryToken::And(word),
            "or" => QueryToken::Or(word),
            "not" => QueryToken::Not(word),
            _ => QueryToken::Ident(word),
        };
        single(token)
    }

    /// Reads a bare word up to the next delimiter.
    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if Self::is_delimiter(c) {
                break;
            }
            word.push(c);
            self.next_char();
        }
        word
    }

    /// Reads a quoted string (single or double quotes), resolving `\` escapes.
    fn read_quoted_string(&mut self, quote_char: char) -> QueryResult<String> {
        // Consume the opening quote
        self.next_char();
        let start = self.position;

        let mut result = String::new();
        while let Some(c) = self.next_char() {
            if c == quote_char {
                return Ok(result);
            }
            if c == '\\' {
                match self.next_char() {
                    Some(escaped) => result.push(escaped),
                    None => break,
                }
            } else {
                result.push(c);
            }
        }
        Err(QueryError::UnterminatedString { position: start })
    }

    /// Reads a `/pattern/flags` literal.
    ///
    /// Backslash escapes are kept verbatim so the regex engine sees them;
    /// an escaped `/` does not end the pattern.
    fn read_regex(&mut self) -> QueryResult<(String, String)> {
        // Consume the opening slash
        self.next_char();

        let mut pattern = String::new();
        while let Some(c) = self.next_char() {
            match c {
                '/' => {
                    let flags = self.read_regex_flags();
                    return Ok((pattern, flags));
                }
                '\\' => {
                    pattern.push(c);
                    match self.next_char() {
                        Some(escaped) => pattern.push(escaped),
                        None => break,
                    }
                }
                _ => pattern.push(c),
            }
        }
        Err(QueryError::UnterminatedRegex)
    }

    fn read_regex_flags(&mut self) -> String {
        let mut flags = String::new();
        while let Some(c) = self.peek() {
            if c != 'i' && c != 'm' {
                break;
            }
            flags.push(c);
            self.next_char();
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<QueryToken> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_lexer_words_and_colon() {
        assert_eq!(
            tokens("title:milk"),
            vec![
                QueryToken::Ident("title".to_string()),
                QueryToken::Colon,
                QueryToken::Ident("milk".to_string()),
            ]
        );
    }

    #[test]
    fn test_lexer_keywords_case_insensitive() {
        assert_eq!(
            tokens("a AND b Or NOT c"),
            vec![
                QueryToken::Ident("a".to_string()),
                QueryToken::And("AND".to_string()),
                QueryToken::Ident("b".to_string()),
                QueryToken::Or("Or".to_string()),
                QueryToken::Not("NOT".to_string()),
                QueryToken::Ident("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_lexer_symbolic_operators() {
        assert_eq!(
            tokens("a && !b || c"),
            vec![
                QueryToken::Ident("a".to_string()),
                QueryToken::And("&&".to_string()),
                QueryToken::Not("!".to_string()),
                QueryToken::Ident("b".to_string()),
                QueryToken::Or("||".to_string()),
                QueryToken::Ident("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_lexer_single_ampersand_is_a_word() {
        assert_eq!(tokens("&x"), vec![QueryToken::Ident("&x".to_string())]);
    }

    #[test]
    fn test_lexer_quoted_strings_resolve_escapes() {
        assert_eq!(
            tokens(r#""say \"hi\"" 'it\'s'"#),
            vec![
                QueryToken::Str("say \"hi\"".to_string()),
                QueryToken::Str("it's".to_string()),
            ]
        );
    }

    #[test]
    fn test_lexer_regex_keeps_escapes_and_flags() {
        assert_eq!(
            tokens(r"/a\/b\d+/im"),
            vec![QueryToken::Regex {
                pattern: r"a\/b\d+".to_string(),
                flags: "im".to_string(),
            }]
        );
    }

    #[test]
    fn test_lexer_positions_are_byte_offsets() {
        let toks = Lexer::new("  (x)").tokenize().unwrap();
        assert_eq!(toks[0].position, 2);
        assert_eq!(toks[1].position, 3);
        assert_eq!(toks[2].position, 4);
    }

    #[test]
    fn test_lexer_unterminated_string_reports_start() {
        let err = Lexer::new("title:\"open").tokenize().unwrap_err();
        assert_eq!(err, QueryError::UnterminatedString { position: 7 });
    }

    #[test]
    fn test_lexer_unterminated_regex() {
        let err = Lexer::new("/abc").tokenize().unwrap_err();
        assert_eq!(err, QueryError::UnterminatedRegex);
    }

    #[test]
    fn test_lexer_empty_input() {
        assert!(tokens("   ").is_empty());
    }
}
