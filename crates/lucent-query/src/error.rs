//! Error types for keys parsing and language ids.

use std::{error::Error, fmt};

use thiserror::Error;

/// Invalid language id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LanguageError {
    /// The id was empty.
    #[error("language id must not be empty")]
    Empty,
    /// The id contains a character reserved by the field naming scheme.
    #[error("language id '{id}' contains reserved character '{ch}'")]
    InvalidCharacter {
        /// The rejected id.
        id: String,
        /// The offending character.
        ch: char,
    },
}

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// Error message.
    pub message: String,
    /// Byte position in input where error occurred.
    pub position: usize,
    /// The original input string.
    pub input: String,
}

impl LexError {
    /// Creates a new lexer error.
    pub fn new(message: impl Into<String>, position: usize, input: &str) -> Self {
        Self {
            message: message.into(),
            position,
            input: input.to_string(),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "keys syntax error: {}", self.message)?;
        writeln!(f, "  {}", self.input)?;
        write!(f, "  {}^", " ".repeat(self.position))
    }
}

impl Error for LexError {}

/// Parse error with token position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Error message.
    pub message: String,
    /// Byte offset of the offending token, if known.
    pub position: Option<usize>,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(message: impl Into<String>, position: Option<usize>) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(pos) => write!(f, "at offset {pos}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl Error for ParseError {}

/// A unified error for parsing user keys.
///
/// Carries the original input so the error can be shown with a position marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    /// The kind of error that occurred.
    pub kind: QueryErrorKind,
    /// The original keys string (if available).
    pub input: Option<String>,
}

/// The specific kind of keys error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Tokenization failed.
    Lex {
        /// Error message.
        message: String,
        /// Byte position in input.
        position: usize,
    },
    /// Invalid syntax.
    Parse {
        /// Error message.
        message: String,
        /// Byte position in input (if available).
        position: Option<usize>,
    },
}

impl QueryError {
    /// Creates a lex error.
    pub fn lex(message: impl Into<String>, position: usize, input: impl Into<String>) -> Self {
        Self {
            kind: QueryErrorKind::Lex {
                message: message.into(),
                position,
            },
            input: Some(input.into()),
        }
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>, position: Option<usize>, input: Option<String>) -> Self {
        Self {
            kind: QueryErrorKind::Parse {
                message: message.into(),
                position,
            },
            input,
        }
    }

    /// Sets the input string for this error.
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Returns the error message without context.
    pub fn message(&self) -> &str {
        match &self.kind {
            QueryErrorKind::Lex { message, .. } | QueryErrorKind::Parse { message, .. } => message,
        }
    }

    /// Returns the byte position of the error, if known.
    pub fn position(&self) -> Option<usize> {
        match &self.kind {
            QueryErrorKind::Lex { position, .. } => Some(*position),
            QueryErrorKind::Parse { position, .. } => *position,
        }
    }

    /// Returns a suggestion for common errors.
    pub fn suggestion(&self) -> Option<&'static str> {
        let message = self.message();
        if message.contains("unclosed quote") {
            Some("Add a closing quote (\") to complete the phrase")
        } else if message.contains("closing parenthesis") {
            Some("Add a closing parenthesis ) to match the opening one")
        } else if message.contains("OR") {
            Some("OR requires keys on both sides, e.g., 'rust OR golang'")
        } else {
            None
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "keys syntax error: {}", self.message())?;

        if let Some(input) = &self.input {
            writeln!(f, "  {input}")?;
            if let Some(pos) = self.position() {
                let clamped = pos.min(input.len());
                writeln!(f, "  {}^", " ".repeat(clamped))?;
            }
        }

        if let Some(suggestion) = self.suggestion() {
            write!(f, "hint: {suggestion}")?;
        }

        Ok(())
    }
}

impl Error for QueryError {}

impl From<LexError> for QueryError {
    fn from(err: LexError) -> Self {
        Self {
            kind: QueryErrorKind::Lex {
                message: err.message,
                position: err.position,
            },
            input: Some(err.input),
        }
    }
}

impl From<ParseError> for QueryError {
    fn from(err: ParseError) -> Self {
        Self {
            kind: QueryErrorKind::Parse {
                message: err.message,
                position: err.position,
            },
            input: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display() {
        let err = QueryError::lex("unclosed quote", 0, "\"hello world");
        let display = err.to_string();
        assert!(display.contains("unclosed quote"));
        assert!(display.contains("\"hello world"));
        assert!(display.contains('^'));
        assert!(display.contains("hint:"));
    }

    #[test]
    fn parse_error_keeps_position() {
        let err = QueryError::from(ParseError::new("expected closing parenthesis", Some(5)))
            .with_input("(rust");
        assert_eq!(err.position(), Some(5));
        let display = err.to_string();
        assert!(display.contains("(rust"));
        assert!(display.contains("     ^"));
        assert!(display.contains("hint:"));
    }

    #[test]
    fn or_error_suggestion() {
        let err = QueryError::parse("unexpected OR", None, None);
        assert!(err.suggestion().unwrap().contains("OR requires"));
    }

    #[test]
    fn plain_message_has_no_hint() {
        let err = QueryError::parse("unexpected end of keys", None, None);
        assert!(err.suggestion().is_none());
        assert_eq!(err.message(), "unexpected end of keys");
    }
}
