//! Source span and location tracking.
//!
//! Two notions of position coexist in the compiler:
//!
//! - [`Span`] is a byte range into the *physical* input handed to the lexer,
//!   used to label diagnostics against the text we actually scanned.
//! - [`SourceLocation`] is the *logical* position (file, line, column) after
//!   `#line` directives from the preprocessor have been honoured. This is
//!   what appears in user-facing messages.

use serde::{Deserialize, Serialize};

/// A precomputed index of line start positions for O(log n) line/column lookup.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offsets where each line starts. line_starts[0] = 0 (line 1 starts at byte 0).
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Build a line index from source code. O(n) one-time cost.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self { line_starts }
    }

    /// Look up line and column for a byte offset. 1-indexed, O(log n).
    pub fn line_col(&self, offset: usize) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line = (line_idx + 1) as u32;
        let col = (offset - self.line_starts[line_idx] + 1) as u32;
        (line, col)
    }
}

/// A span representing a contiguous byte region in the scanned input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of the start (inclusive).
    pub start: usize,
    /// Byte offset of the end (exclusive).
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A span for synthesized tokens that have no position in the input.
    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans into one that covers both.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::dummy()
    }
}

/// Logical source position: filename, 1-indexed line and column.
///
/// The lexer rewrites `file` and the line mapping when it honours a `#line`
/// directive; columns always count physical characters since the last
/// newline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    pub fn start_of(file: impl Into<String>) -> Self {
        Self::new(file, 1, 1)
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::new("<unknown>", 1, 1)
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
