//! Error types for the JSON parser.
//!
//! Errors are split into two stages:
//!
//! - [`LexerError`] — failures during tokenization (unterminated strings, unexpected characters).
//! - [`ParseError`] — failures during parsing (unexpected tokens, premature end of input).
//!
//! Every message ends with a `(line:column)` suffix pointing at the offending
//! character; [`ParseError::message`] returns the text without it.

use crate::ast::Position;
use thiserror::Error;

/// An error that occurs during tokenization (lexing).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexerError {
    /// A character that cannot start or continue any token in the current mode.
    #[error("Unexpected character '{ch}' found. ({position})")]
    UnexpectedChar { ch: char, position: Position },

    /// A string literal was opened but never closed.
    #[error("Unterminated string found. ({position})")]
    UnterminatedString { position: Position },

    /// A `/* ... */` comment was opened but never closed.
    #[error("Unterminated comment found. ({position})")]
    UnterminatedComment { position: Position },

    /// A backslash escape sequence was not recognized.
    #[error("Invalid escape sequence '\\{ch}' found. ({position})")]
    InvalidEscape { ch: char, position: Position },

    /// The input ended in the middle of a token.
    #[error("Unexpected end of input found. ({position})")]
    UnexpectedEof { position: Position },

    /// Objects and arrays are nested deeper than the parser allows.
    #[error("Maximum nesting depth of {limit} exceeded. ({position})")]
    MaxDepthExceeded { limit: usize, position: Position },
}

impl LexerError {
    /// Returns the source position where this error occurred.
    pub fn position(&self) -> Position {
        match self {
            LexerError::UnexpectedChar { position, .. } => *position,
            LexerError::UnterminatedString { position } => *position,
            LexerError::UnterminatedComment { position } => *position,
            LexerError::InvalidEscape { position, .. } => *position,
            LexerError::UnexpectedEof { position } => *position,
            LexerError::MaxDepthExceeded { position, .. } => *position,
        }
    }
}

/// An error that occurs during parsing.
///
/// Includes both parse-level errors and forwarded [`LexerError`]s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A tokenization error propagated from the lexer.
    #[error("{0}")]
    Lexer(#[from] LexerError),

    /// The parser found a token that cannot appear here.
    #[error("Unexpected token {found} found. ({position})")]
    UnexpectedToken { found: String, position: Position },

    /// The input ended while the parser still expected more tokens.
    #[error("Unexpected end of input found. ({position})")]
    UnexpectedEof { position: Position },

    /// Objects and arrays are nested deeper than the parser allows.
    #[error("Maximum nesting depth of {limit} exceeded. ({position})")]
    MaxDepthExceeded { limit: usize, position: Position },
}

impl ParseError {
    /// Returns the source position where this error occurred.
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lexer(e) => e.position(),
            ParseError::UnexpectedToken { position, .. } => *position,
            ParseError::UnexpectedEof { position } => *position,
            ParseError::MaxDepthExceeded { position, .. } => *position,
        }
    }

    /// The error text without the trailing `(line:column)` suffix.
    pub fn message(&self) -> String {
        let full = self.to_string();
        match full.rfind('(') {
            Some(idx) => full[..idx].trim().to_string(),
            None => full,
        }
    }
}

/// Result type alias for parser operations
pub type ParseResult<T> = Result<T, ParseError>;
