// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Source positions.
//!
//! A [`Span`] records where a token or AST node sits in the source string,
//! as a byte offset plus a length. The scanner stamps one onto every token;
//! the parser merges them bottom-up while building nodes, so a composite
//! node covers everything it was built from. Diagnostics hand spans to
//! miette for the labeled source window.

/// A region of source text: byte offset plus byte length.
///
/// # Examples
///
/// ```
/// use kava_core::source_analysis::Span;
///
/// let span = Span::new(4, 10);
/// assert_eq!(span.start(), 4);
/// assert_eq!(span.end(), 10);
/// assert_eq!(span.len(), 6);
/// assert_eq!(span.to_string(), "4..10");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    offset: u32,
    len: u32,
}

impl Span {
    /// Creates a span covering `start..end`. An end before the start is
    /// clamped to an empty span at `start`.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self {
            offset: start,
            len: end.saturating_sub(start),
        }
    }

    /// Creates a zero-length span at `offset`, for positions rather than
    /// regions (layout markers, end-of-input).
    #[must_use]
    pub const fn point(offset: u32) -> Self {
        Self { offset, len: 0 }
    }

    /// The starting byte offset.
    #[must_use]
    pub const fn start(self) -> u32 {
        self.offset
    }

    /// One past the last byte.
    #[must_use]
    pub const fn end(self) -> u32 {
        self.offset + self.len
    }

    /// The length in bytes.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.len
    }

    /// Returns true for a zero-length span.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    /// The smallest span covering both `self` and `other`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        let start = self.offset.min(other.offset);
        let end = self.end().max(other.end());
        Self::new(start, end)
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start(), self.end())
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::new((span.offset as usize).into(), span.len as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_accessors() {
        let span = Span::new(4, 10);
        assert_eq!(span.start(), 4);
        assert_eq!(span.end(), 10);
        assert_eq!(span.len(), 6);
        assert!(!span.is_empty());
    }

    #[test]
    fn points_are_empty() {
        let span = Span::point(7);
        assert!(span.is_empty());
        assert_eq!(span.start(), 7);
        assert_eq!(span.end(), 7);
    }

    #[test]
    fn inverted_bounds_clamp_to_empty() {
        let span = Span::new(9, 3);
        assert!(span.is_empty());
        assert_eq!(span.start(), 9);
    }

    #[test]
    fn merge_covers_both_in_either_order() {
        let a = Span::new(2, 5);
        let b = Span::new(8, 11);
        assert_eq!(a.merge(b), Span::new(2, 11));
        assert_eq!(b.merge(a), Span::new(2, 11));
    }

    #[test]
    fn merge_of_nested_spans_keeps_the_outer() {
        let outer = Span::new(1, 20);
        let inner = Span::new(5, 9);
        assert_eq!(outer.merge(inner), outer);
    }

    #[test]
    fn display_form() {
        assert_eq!(Span::new(3, 8).to_string(), "3..8");
        assert_eq!(Span::point(3).to_string(), "3..3");
    }

    #[test]
    fn converts_into_miette_source_span() {
        let source_span: miette::SourceSpan = Span::new(4, 10).into();
        assert_eq!(source_span.offset(), 4);
        assert_eq!(source_span.len(), 6);
    }
}
