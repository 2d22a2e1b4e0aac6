//! Error taxonomy for the Jack compiler.
//!
//! The tokenizer, compilation engine, and CLI each surface their own tagged
//! error type; [`CompileError`] unifies them for the top-level `Result` that
//! `main` matches on. Nothing here is recovered -- the first error aborts
//! translation of the current file (see spec §7).

use std::fmt;
use std::io;

use crate::token::Token;

#[derive(Debug)]
pub enum LexError {
    /// An integer literal fell outside `0..=32767`.
    IntOutOfRange { line: usize, text: String },
    /// A `"..."` string literal was never closed before end of file.
    UnterminatedString { line: usize },
    /// A `/*` or `/**` block comment was never closed before end of file.
    UnterminatedComment { line: usize },
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::IntOutOfRange { line, text } => {
                write!(f, "line {line}: integer literal '{text}' out of range 0..=32767")
            }
            LexError::UnterminatedString { line } => {
                write!(f, "line {line}: unterminated string literal")
            }
            LexError::UnterminatedComment { line } => {
                write!(f, "line {line}: unterminated block comment")
            }
        }
    }
}

impl std::error::Error for LexError {}

#[derive(Debug)]
pub enum ParseError {
    /// A construct expected one kind of token but found another.
    UnexpectedToken { line: usize, expected: String, found: String },
    /// The token stream ran out mid-production.
    UnexpectedEof { expected: String },
}

impl ParseError {
    pub fn unexpected(token: &Token, expected: impl Into<String>) -> ParseError {
        ParseError::UnexpectedToken {
            line: token.line,
            expected: expected.into(),
            found: token.describe(),
        }
    }

    pub fn eof(expected: impl Into<String>) -> ParseError {
        ParseError::UnexpectedEof { expected: expected.into() }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedToken { line, expected, found } => {
                write!(f, "line {line}: expected {expected}, found {found}")
            }
            ParseError::UnexpectedEof { expected } => {
                write!(f, "unexpected end of input: expected {expected}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug)]
pub enum SemanticError {
    /// An identifier was used in an l-value position (`let` target) without
    /// having been declared in either symbol table scope.
    UndeclaredIdentifier { line: usize, name: String },
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticError::UndeclaredIdentifier { line, name } => {
                write!(f, "line {line}: undeclared identifier '{name}' used as an assignment target")
            }
        }
    }
}

impl std::error::Error for SemanticError {}

/// The union of every way a single `.jack` file can fail to compile.
#[derive(Debug)]
pub enum CompileError {
    Lex(LexError),
    Parse(ParseError),
    Semantic(SemanticError),
    Io(io::Error),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Lex(e) => write!(f, "{e}"),
            CompileError::Parse(e) => write!(f, "{e}"),
            CompileError::Semantic(e) => write!(f, "{e}"),
            CompileError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<LexError> for CompileError {
    fn from(e: LexError) -> Self {
        CompileError::Lex(e)
    }
}

impl From<ParseError> for CompileError {
    fn from(e: ParseError) -> Self {
        CompileError::Parse(e)
    }
}

impl From<SemanticError> for CompileError {
    fn from(e: SemanticError) -> Self {
        CompileError::Semantic(e)
    }
}

impl From<io::Error> for CompileError {
    fn from(e: io::Error) -> Self {
        CompileError::Io(e)
    }
}
