//! Error types for JSON parsing.
//!
//! Serialization has no error type: every input degrades to some output
//! (non-finite numbers become `null`, absent members are dropped).

use thiserror::Error;

/// The grammar violation detected by the parser.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The cursor is on a character that cannot start (or follow) a value.
    #[error("unexpected token '{found}'")]
    UnexpectedToken { found: char },

    /// An object key position did not hold a `"`.
    #[error("expected a string key")]
    ExpectedString { found: char },

    #[error("expected ':' after object key")]
    ExpectedColon { found: char },

    #[error("expected ',' or '}}' after object member")]
    ExpectedCommaOrBrace { found: char },

    #[error("expected ',' or ']' after array element")]
    ExpectedCommaOrBracket { found: char },

    /// End of input reached before the closing `"` of a string.
    #[error("unterminated string")]
    UnterminatedString,

    /// End of input reached before the closing `}` of an object.
    #[error("unterminated object")]
    UnterminatedObject,

    /// End of input reached before the closing `]` of an array.
    #[error("unterminated array")]
    UnterminatedArray,

    /// The cursor ran past the end of input while a value or closer was expected.
    #[error("unexpected end of input")]
    CursorOverrun,

    /// A numeric token that does not convert to a finite double.
    #[error("invalid number")]
    InvalidNumber,

    /// Arrays/objects nested deeper than `ParseOptions::max_depth`.
    #[error("nesting too deep")]
    NestingTooDeep,
}

/// A parse failure, positioned at the cursor where the input diverged from the grammar.
///
/// `position` is a byte offset into the UTF-8 input. `line` and `column` are
/// 1-based; the column counts characters, not bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at line {line}, column {column} (position {position})")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: usize,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    /// Build an error at byte offset `position` of `text`, deriving line and column.
    pub fn at(kind: ParseErrorKind, text: &str, position: usize) -> Self {
        let position = position.min(text.len());
        let mut line = 1;
        let mut column = 1;
        for (offset, ch) in text.char_indices() {
            if offset >= position {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self {
            kind,
            position,
            line,
            column,
        }
    }

    /// The offending character, when the error names one.
    pub fn found(&self) -> Option<char> {
        match self.kind {
            ParseErrorKind::UnexpectedToken { found }
            | ParseErrorKind::ExpectedString { found }
            | ParseErrorKind::ExpectedColon { found }
            | ParseErrorKind::ExpectedCommaOrBrace { found }
            | ParseErrorKind::ExpectedCommaOrBracket { found } => Some(found),
            _ => None,
        }
    }
}

/// Convenience alias used throughout jsonrt-core.
pub type Result<T> = std::result::Result<T, ParseError>;
