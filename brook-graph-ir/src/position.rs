//! Source positions for diagnostics

use serde::{Deserialize, Serialize};

/// A 1-based line/column position in the source text.
///
/// `TextPosition::UNKNOWN` (`-1, -1`) is used when no position is meaningful,
/// e.g. for failures detected on another thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextPosition {
    pub line: i64,
    pub column: i64,
}

impl TextPosition {
    /// Position sentinel for "no meaningful location".
    pub const UNKNOWN: TextPosition = TextPosition {
        line: -1,
        column: -1,
    };

    pub fn new(line: i64, column: i64) -> Self {
        Self { line, column }
    }

    pub fn is_known(&self) -> bool {
        self.line >= 0 && self.column >= 0
    }
}

impl std::fmt::Display for TextPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[line: {}, col: {}]", self.line, self.column)
    }
}
