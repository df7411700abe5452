//! Source location tracking for error reporting
//!
//! Every token, AST node and compiler error carries one of these so a
//! diagnostic can point back at the offending line of the input program.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A location in a source file (line and column are 1-based)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub filename: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    /// Create a location with filename
    pub fn new(filename: &str, line: u32, column: u32) -> Self {
        Self {
            filename: filename.to_string(),
            line,
            column,
        }
    }

    /// Create a dummy location for testing
    pub fn dummy() -> Self {
        Self::new("<unknown>", 0, 0)
    }

    /// Location in the anonymous `<input>` file
    pub fn new_simple(line: u32, column: u32) -> Self {
        Self::new("<input>", line, column)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

/// A span in a source file (from start to end location)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }

    /// Create a span from a single location
    pub fn from_location(location: SourceLocation) -> Self {
        Self {
            end: location.clone(),
            start: location,
        }
    }

    /// Create a dummy span for testing
    pub fn dummy() -> Self {
        Self::from_location(SourceLocation::dummy())
    }

    /// Extend this span to include another span
    pub fn extend(&self, other: &SourceSpan) -> SourceSpan {
        if self.start.filename != other.start.filename {
            return self.clone();
        }

        let start = if (self.start.line, self.start.column) <= (other.start.line, other.start.column) {
            self.start.clone()
        } else {
            other.start.clone()
        };

        let end = if (self.end.line, self.end.column) >= (other.end.line, other.end.column) {
            self.end.clone()
        } else {
            other.end.clone()
        };

        SourceSpan::new(start, end)
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.filename != self.end.filename {
            write!(f, "{} to {}", self.start, self.end)
        } else if self.start.line == self.end.line {
            if self.start.column == self.end.column {
                write!(f, "{}", self.start)
            } else {
                write!(
                    f,
                    "{}:{}:{}-{}",
                    self.start.filename, self.start.line, self.start.column, self.end.column
                )
            }
        } else {
            write!(
                f,
                "{}:{}:{}-{}:{}",
                self.start.filename, self.start.line, self.start.column, self.end.line, self.end.column
            )
        }
    }
}

/// Line/column cursor used by the lexer while it walks the input
#[derive(Debug, Clone)]
pub struct SourceTracker {
    filename: String,
    line: u32,
    column: u32,
}

impl SourceTracker {
    pub fn new(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            line: 1,
            column: 1,
        }
    }

    /// Get current location
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(&self.filename, self.line, self.column)
    }

    /// Advance by one character
    pub fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// Create a span from a start location to current location
    pub fn span_from(&self, start: SourceLocation) -> SourceSpan {
        SourceSpan::new(start, self.location())
    }
}
