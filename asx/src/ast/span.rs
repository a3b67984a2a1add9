//! Source location tracking
//!
//! ASX is line-oriented, so a location is the 1-based physical line a
//! statement came from. Nested bodies keep their original line numbers.

use serde::{Deserialize, Serialize};

/// A source location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub line: usize,
}

impl Span {
    pub fn new(line: usize) -> Self {
        Self { line }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}", self.line)
    }
}

impl From<usize> for Span {
    fn from(line: usize) -> Self {
        Span::new(line)
    }
}

/// A value with source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    /// Line number shortcut
    pub fn line(&self) -> usize {
        self.span.line
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Spanned<U> {
        Spanned {
            node: f(self.node),
            span: self.span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_display() {
        assert_eq!(Span::new(12).to_string(), "line 12");
    }

    #[test]
    fn test_span_from_usize() {
        let span: Span = 7.into();
        assert_eq!(span.line, 7);
    }

    #[test]
    fn test_spanned_map_keeps_line() {
        let s = Spanned::new(2, Span::new(4));
        let mapped = s.map(|n| n * 10);
        assert_eq!(mapped.node, 20);
        assert_eq!(mapped.line(), 4);
    }
}
