//! Error handling for the pifive compiler
//!
//! Every failure is fatal for the compilation unit: the first error aborts
//! the traversal and is surfaced to the caller with its source location.

use crate::source_loc::SourceLocation;
use thiserror::Error;

/// Main compiler error type that encompasses all phases of compilation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompilerError {
    #[error("Lexical error at {location}: {message}")]
    LexError {
        location: SourceLocation,
        message: String,
    },

    #[error("Parse error at {location}: {message}")]
    ParseError {
        location: SourceLocation,
        message: String,
    },

    #[error("Undefined {kind} '{name}' at {location}")]
    UndefinedName {
        kind: &'static str,
        name: String,
        location: SourceLocation,
    },

    #[error("Function '{name}' is already defined in this scope at {location}")]
    DuplicateFunction {
        name: String,
        location: SourceLocation,
    },

    #[error("Function '{name}' takes {expected} argument(s) but {found} were given at {location}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        location: SourceLocation,
    },

    #[error("Unsupported construct at {location}: {construct}")]
    UnsupportedConstruct {
        construct: String,
        location: SourceLocation,
    },

    #[error("Malformed statement at {location}: {message}")]
    MalformedStatement {
        message: String,
        location: SourceLocation,
    },

    #[error("Internal compiler error: no {class} register available after spilling")]
    RegisterExhausted { class: String },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Internal compiler error: {message}")]
    InternalError { message: String },
}

impl CompilerError {
    /// Create a lexer error
    pub fn lexer_error(message: String, location: SourceLocation) -> Self {
        CompilerError::LexError { location, message }
    }

    /// Create a parse error
    pub fn parse_error(message: String, location: SourceLocation) -> Self {
        CompilerError::ParseError { location, message }
    }

    /// Create an unsupported-construct error
    pub fn unsupported(construct: impl Into<String>, location: SourceLocation) -> Self {
        CompilerError::UnsupportedConstruct {
            construct: construct.into(),
            location,
        }
    }

    /// Create a malformed-statement error
    pub fn malformed(message: impl Into<String>, location: SourceLocation) -> Self {
        CompilerError::MalformedStatement {
            message: message.into(),
            location,
        }
    }

    /// Source location of the error, when it has one
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            CompilerError::LexError { location, .. }
            | CompilerError::ParseError { location, .. }
            | CompilerError::UndefinedName { location, .. }
            | CompilerError::DuplicateFunction { location, .. }
            | CompilerError::ArityMismatch { location, .. }
            | CompilerError::UnsupportedConstruct { location, .. }
            | CompilerError::MalformedStatement { location, .. } => Some(location),
            CompilerError::RegisterExhausted { .. }
            | CompilerError::IoError { .. }
            | CompilerError::InternalError { .. } => None,
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for CompilerError {
    fn from(err: std::io::Error) -> Self {
        CompilerError::IoError {
            message: err.to_string(),
        }
    }
}

/// Convert from String (for simple error cases)
impl From<String> for CompilerError {
    fn from(message: String) -> Self {
        CompilerError::InternalError { message }
    }
}
