//! Error taxonomy for the VM translator.

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum ParseError {
    UnknownCommand { line: usize, text: String },
    UnknownSegment { line: usize, text: String },
    MalformedIndex { line: usize, text: String },
    MissingArgument { line: usize, text: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnknownCommand { line, text } => {
                write!(f, "line {line}: unknown command '{text}'")
            }
            ParseError::UnknownSegment { line, text } => {
                write!(f, "line {line}: unknown memory segment '{text}'")
            }
            ParseError::MalformedIndex { line, text } => {
                write!(f, "line {line}: '{text}' is not a valid non-negative index")
            }
            ParseError::MissingArgument { line, text } => {
                write!(f, "line {line}: '{text}' is missing a required argument")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// The union of every way a VM command stream can fail to translate.
#[derive(Debug)]
pub enum TranslateError {
    Parse(ParseError),
    /// `pop constant <i>` has no meaningful target memory cell.
    InvalidPopTarget,
    Io(io::Error),
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslateError::Parse(e) => write!(f, "{e}"),
            TranslateError::InvalidPopTarget => {
                write!(f, "'pop constant' has no addressable target")
            }
            TranslateError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for TranslateError {}

impl From<ParseError> for TranslateError {
    fn from(e: ParseError) -> Self {
        TranslateError::Parse(e)
    }
}

impl From<io::Error> for TranslateError {
    fn from(e: io::Error) -> Self {
        TranslateError::Io(e)
    }
}
