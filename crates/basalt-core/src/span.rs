//! Source positions carried by declarations and diagnostics.

use std::fmt;

/// Where a declaration or statement begins.
///
/// Printed as `line:col`. A diagnostic's span is back-filled by the
/// nearest enclosing declaration when it has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// 1-based line.
    pub line: u32,
    /// 1-based byte column.
    pub col: u32,
}

impl Span {
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
