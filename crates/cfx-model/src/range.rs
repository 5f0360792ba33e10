//! Line-range bookkeeping for module elements.

use serde::{Deserialize, Serialize};

/// An inclusive, 1-based span of source lines.
///
/// Ranges are derived from content: after any insertion the owning module
/// is renumbered, so ranges within a module never overlap and always
/// increase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start_line: usize,
    pub end_line: usize,
}

impl TextRange {
    pub fn new(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            end_line,
        }
    }

    /// The range covering `count` lines beginning at `start_line`.
    ///
    /// A zero-length span collapses onto its start line.
    pub fn spanning(start_line: usize, count: usize) -> Self {
        Self::new(start_line, start_line + count.saturating_sub(1))
    }

    /// Number of lines covered.
    pub fn line_count(&self) -> usize {
        self.end_line + 1 - self.start_line
    }

    /// Returns `true` if `self` begins strictly after `other` ends.
    pub fn follows(&self, other: &TextRange) -> bool {
        self.start_line > other.end_line
    }
}
