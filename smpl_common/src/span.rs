//! Source location tracking for the smpl compiler
//!
//! An smpl token never crosses a line boundary, so a location is a 1-based
//! line/column pair plus the token's character length. The caret rendering
//! used by error messages lives here too: a span knows how to underline
//! itself beneath its source line.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of a token in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
    pub len: u32,
}

impl Span {
    pub fn new(line: u32, column: u32, len: u32) -> Self {
        Self { line, column, len }
    }

    /// A single-character location, for cursor positions and end of file
    pub fn point(line: u32, column: u32) -> Self {
        Self::new(line, column, 1)
    }

    /// The caret run that marks the spanned characters when printed beneath
    /// their source line:
    ///
    /// ```text
    /// let bee <- 2;
    ///     ^^^
    /// ```
    pub fn underline(&self) -> String {
        let pad = " ".repeat(self.column.saturating_sub(1) as usize);
        let carets = "^".repeat(self.len.max(1) as usize);
        format!("{}{}", pad, carets)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
