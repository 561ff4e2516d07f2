//! Syntax errors in setup files.

use std::fmt;

use super::lexer::Token;

/// A malformed declaration. The declaration is dropped and parsing continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Line of the offending token (1-based).
    pub line: usize,
    /// What the parser expected.
    pub message: String,
    /// Description of the token actually found.
    pub found: String,
    at_boundary: bool,
}

impl SyntaxError {
    /// Creates an error for `token`, seen on `line`.
    #[must_use]
    pub fn new(line: usize, message: impl Into<String>, token: &Token) -> Self {
        Self {
            line,
            message: message.into(),
            found: token.describe(),
            at_boundary: token.is_boundary(),
        }
    }

    /// Whether the offending token already ended the record.
    #[must_use]
    pub const fn at_boundary(&self) -> bool {
        self.at_boundary
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} (got {})", self.line, self.message, self.found)
    }
}

impl std::error::Error for SyntaxError {}
