use std::fmt;

use thiserror::Error;

/// Location of a parse failure in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub(super) fn locate(source: &str, offset: usize) -> Self {
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |index| index + 1);
        Self {
            offset,
            line,
            column: before[line_start..].chars().count() + 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// What the parser saw where it expected something else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Found {
    Char(char),
    EndOfInput,
}

impl From<Option<char>> for Found {
    fn from(value: Option<char>) -> Self {
        value.map_or(Found::EndOfInput, Found::Char)
    }
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Found::Char(ch) => write!(f, "'{ch}'"),
            Found::EndOfInput => f.write_str("end of input"),
        }
    }
}

/// Syntax errors. The first one aborts the parse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected character {found} in expression at {position}")]
    UnexpectedCharacter { found: Found, position: Position },
    #[error("Expected identifier, got {found} at {position}")]
    ExpectedIdentifier { found: Found, position: Position },
    #[error("Expected '{expected}', got {found} at {position}")]
    ExpectedCharacter {
        expected: char,
        found: Found,
        position: Position,
    },
    #[error("Integer literal '{literal}' is out of range at {position}")]
    IntegerOutOfRange { literal: String, position: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedCharacter { position, .. }
            | ParseError::ExpectedIdentifier { position, .. }
            | ParseError::ExpectedCharacter { position, .. }
            | ParseError::IntegerOutOfRange { position, .. } => *position,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
