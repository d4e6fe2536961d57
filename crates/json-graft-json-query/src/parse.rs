//! Query expression parser.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryParseError {
    #[error("Expected root identifier '$' at start")]
    ExpectedRoot,
    #[error("Unexpected character: {0}")]
    UnexpectedChar(char),
    #[error("Unexpected end of input")]
    UnexpectedEnd,
    #[error("Unclosed string")]
    UnclosedString,
    #[error("Invalid escape sequence")]
    InvalidEscape,
    #[error("Invalid number")]
    InvalidNumber,
    #[error("Invalid selector")]
    InvalidSelector,
}

/// One step of a parsed query.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Property access: `.name` or `['name']`.
    Key(String),
    /// Array element access: `[0]`, `[-1]`.
    Index(isize),
    /// All children: `.*` or `[*]`.
    Wildcard,
    /// Conditional selection of children: `[?(@.field == literal)]`.
    Filter {
        /// Field path relative to each candidate child (`@.a.b`).
        field: Vec<String>,
        test: FilterTest,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterTest {
    /// Bare `@.field` - the field must exist.
    Exists,
    /// `@.field <op> literal`.
    Cmp { op: CmpOp, value: Value },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A parsed query expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub selectors: Vec<Selector>,
}

/// Parse a query expression.
pub fn parse(input: &str) -> Result<Query, QueryParseError> {
    let mut cursor = Cursor { input, pos: 0 };
    cursor.parse_query()
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn parse_query(&mut self) -> Result<Query, QueryParseError> {
        if self.peek() != Some('$') {
            return Err(QueryParseError::ExpectedRoot);
        }
        self.advance();

        let mut selectors = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.advance();
                    if self.peek() == Some('*') {
                        self.advance();
                        selectors.push(Selector::Wildcard);
                    } else {
                        selectors.push(Selector::Key(self.parse_identifier()?));
                    }
                }
                '[' => selectors.push(self.parse_bracket()?),
                other => return Err(QueryParseError::UnexpectedChar(other)),
            }
        }
        Ok(Query { selectors })
    }

    fn parse_bracket(&mut self) -> Result<Selector, QueryParseError> {
        self.expect('[')?;
        self.skip_whitespace();
        let selector = match self.peek() {
            Some('\'') | Some('"') => Selector::Key(self.parse_string()?),
            Some('*') => {
                self.advance();
                Selector::Wildcard
            }
            Some('-') | Some('0'..='9') => Selector::Index(self.parse_integer()?),
            Some('?') => {
                self.advance();
                self.skip_whitespace();
                self.expect('(')?;
                let selector = self.parse_filter()?;
                self.skip_whitespace();
                self.expect(')')?;
                selector
            }
            Some(_) => return Err(QueryParseError::InvalidSelector),
            None => return Err(QueryParseError::UnexpectedEnd),
        };
        self.skip_whitespace();
        self.expect(']')?;
        Ok(selector)
    }

    fn parse_filter(&mut self) -> Result<Selector, QueryParseError> {
        self.skip_whitespace();
        self.expect('@')?;

        let mut field = Vec::new();
        loop {
            match self.peek() {
                Some('.') => {
                    self.advance();
                    field.push(self.parse_identifier()?);
                }
                Some('[') => {
                    self.advance();
                    self.skip_whitespace();
                    field.push(self.parse_string()?);
                    self.skip_whitespace();
                    self.expect(']')?;
                }
                _ => break,
            }
        }

        self.skip_whitespace();
        let test = match self.peek_cmp_op() {
            Some((op, len)) => {
                for _ in 0..len {
                    self.advance();
                }
                self.skip_whitespace();
                let value = self.parse_literal()?;
                FilterTest::Cmp { op, value }
            }
            None => FilterTest::Exists,
        };
        Ok(Selector::Filter { field, test })
    }

    fn peek_cmp_op(&self) -> Option<(CmpOp, usize)> {
        let rest = &self.input[self.pos..];
        if rest.starts_with("==") {
            Some((CmpOp::Eq, 2))
        } else if rest.starts_with("!=") {
            Some((CmpOp::Ne, 2))
        } else if rest.starts_with("<=") {
            Some((CmpOp::Le, 2))
        } else if rest.starts_with(">=") {
            Some((CmpOp::Ge, 2))
        } else if rest.starts_with('<') {
            Some((CmpOp::Lt, 1))
        } else if rest.starts_with('>') {
            Some((CmpOp::Gt, 1))
        } else {
            None
        }
    }

    fn parse_literal(&mut self) -> Result<Value, QueryParseError> {
        match self.peek() {
            Some('\'') | Some('"') => Ok(Value::String(self.parse_string()?)),
            Some('-') | Some('0'..='9') => {
                let start = self.pos;
                if self.peek() == Some('-') {
                    self.advance();
                }
                while matches!(self.peek(), Some('0'..='9')) {
                    self.advance();
                }
                if self.peek() == Some('.') {
                    self.advance();
                    while matches!(self.peek(), Some('0'..='9')) {
                        self.advance();
                    }
                }
                let text = &self.input[start..self.pos];
                if let Ok(n) = text.parse::<i64>() {
                    return Ok(Value::from(n));
                }
                let f: f64 = text.parse().map_err(|_| QueryParseError::InvalidNumber)?;
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or(QueryParseError::InvalidNumber)
            }
            _ => {
                if self.consume_word("true") {
                    Ok(Value::Bool(true))
                } else if self.consume_word("false") {
                    Ok(Value::Bool(false))
                } else if self.consume_word("null") {
                    Ok(Value::Null)
                } else {
                    Err(QueryParseError::InvalidSelector)
                }
            }
        }
    }

    fn consume_word(&mut self, word: &str) -> bool {
        if self.input[self.pos..].starts_with(word) {
            self.pos += word.len();
            true
        } else {
            false
        }
    }

    fn parse_identifier(&mut self) -> Result<String, QueryParseError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                self.advance();
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(QueryParseError::UnexpectedEnd);
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_string(&mut self) -> Result<String, QueryParseError> {
        let quote = match self.peek() {
            Some(c @ ('\'' | '"')) => c,
            _ => return Err(QueryParseError::InvalidSelector),
        };
        self.advance();
        let mut result = String::new();
        loop {
            match self.peek() {
                None => return Err(QueryParseError::UnclosedString),
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some(c @ ('\\' | '\'' | '"')) => result.push(c),
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        _ => return Err(QueryParseError::InvalidEscape),
                    }
                    self.advance();
                }
                Some(c) => {
                    result.push(c);
                    self.advance();
                }
            }
        }
    }

    fn parse_integer(&mut self) -> Result<isize, QueryParseError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.advance();
        }
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }
        self.input[start..self.pos]
            .parse()
            .map_err(|_| QueryParseError::InvalidNumber)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), QueryParseError> {
        if self.peek() == Some(expected) {
            self.advance();
            Ok(())
        } else {
            match self.peek() {
                Some(c) => Err(QueryParseError::UnexpectedChar(c)),
                None => Err(QueryParseError::UnexpectedEnd),
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }
}
