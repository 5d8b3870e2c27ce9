// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! A non-destructive cursor over the scanned token vector.
//!
//! The scanner keeps trivia in the stream; the view is where skipping policy
//! lives. [`TokenView::peek`] and [`TokenView::take`] skip whitespace and
//! comments but stop at newlines — the parser crosses line boundaries only
//! through its own indent-aware logic, which uses the raw cursor here.
//!
//! The view's position is plain state: [`TokenView::stash`] /
//! [`TokenView::restore`] give the parser its backtracking primitive.

use super::{Token, TokenKind};

/// A saved cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewCheckpoint(usize);

/// A cursor over a token vector with configurable trivia skipping.
#[derive(Debug, Clone)]
pub struct TokenView {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenView {
    /// Creates a view positioned at the start of `tokens`.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Captures the cursor for a later [`TokenView::restore`].
    #[must_use]
    pub fn stash(&self) -> ViewCheckpoint {
        ViewCheckpoint(self.pos)
    }

    /// Restores a cursor captured by [`TokenView::stash`].
    pub fn restore(&mut self, checkpoint: ViewCheckpoint) {
        self.pos = checkpoint.0;
    }

    /// Index of the token [`TokenView::peek`] would return, skipping
    /// whitespace and comments but stopping at a newline.
    fn peek_index(&self) -> Option<usize> {
        let mut i = self.pos;
        while let Some(token) = self.tokens.get(i) {
            if token.kind().is_trivia() || token.kind().is_layout() {
                i += 1;
            } else {
                return Some(i);
            }
        }
        None
    }

    /// Returns the next non-trivia token without advancing.
    ///
    /// Stops at (and returns) a [`TokenKind::Newline`].
    #[must_use]
    pub fn peek(&self) -> Option<&Token> {
        self.peek_index().map(|i| &self.tokens[i])
    }

    /// Returns the kind of the next non-trivia token.
    #[must_use]
    pub fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(Token::kind)
    }

    /// Returns the next non-trivia, non-newline token without advancing.
    #[must_use]
    pub fn peek_through_newlines(&self) -> Option<&Token> {
        let mut i = self.pos;
        while let Some(token) = self.tokens.get(i) {
            let kind = token.kind();
            if kind.is_trivia() || kind.is_layout() || kind == TokenKind::Newline {
                i += 1;
            } else {
                return Some(token);
            }
        }
        None
    }

    /// Returns the `n`-th upcoming non-trivia token on the current line
    /// (`peek_nth(0)` is [`TokenView::peek`]). Does not cross newlines.
    #[must_use]
    pub fn peek_nth(&self, n: usize) -> Option<&Token> {
        let mut i = self.pos;
        let mut remaining = n;
        while let Some(token) = self.tokens.get(i) {
            let kind = token.kind();
            if kind.is_trivia() || kind.is_layout() {
                i += 1;
                continue;
            }
            if kind == TokenKind::Newline {
                return None;
            }
            if remaining == 0 {
                return Some(token);
            }
            remaining -= 1;
            i += 1;
        }
        None
    }

    /// Returns the next non-trivia token and advances past it.
    pub fn take(&mut self) -> Option<Token> {
        let i = self.peek_index()?;
        self.pos = i + 1;
        Some(self.tokens[i].clone())
    }

    /// Returns `true` iff the very next raw token is whitespace.
    ///
    /// This is the probe that tells `foo(2)` from `foo (2)` and drives the
    /// unary-versus-binary decision inside implicit call arguments.
    #[must_use]
    pub fn peek_space(&self) -> bool {
        self.tokens
            .get(self.pos)
            .is_some_and(|t| t.kind() == TokenKind::Whitespace)
    }

    /// Returns `true` iff [`TokenView::peek`] would return a newline.
    #[must_use]
    pub fn peek_newline(&self) -> bool {
        self.peek_kind() == Some(TokenKind::Newline)
    }

    /// Returns `true` iff whitespace immediately follows the token that
    /// [`TokenView::peek`] would return.
    #[must_use]
    pub fn space_follows_peek(&self) -> bool {
        self.peek_index().is_some_and(|i| {
            self.tokens
                .get(i + 1)
                .is_some_and(|t| t.kind() == TokenKind::Whitespace)
        })
    }

    /// The raw token at the cursor, trivia included.
    #[must_use]
    pub fn raw(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Advances the raw cursor by one token.
    pub fn advance_raw(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Returns `true` once the raw cursor has passed the last token.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::scan;

    fn view(source: &str) -> TokenView {
        TokenView::new(scan(source).unwrap())
    }

    #[test]
    fn peek_skips_trivia_but_stops_at_newline() {
        let v = view("  # note\n  a");
        assert_eq!(v.peek_kind(), Some(TokenKind::Newline));
        assert_eq!(
            v.peek_through_newlines().map(Token::kind),
            Some(TokenKind::Identifier)
        );
    }

    #[test]
    fn take_advances_past_trivia() {
        let mut v = view("a  b");
        assert_eq!(v.take().unwrap().text(), "a");
        assert_eq!(v.take().unwrap().text(), "b");
        assert!(v.take().is_none());
    }

    #[test]
    fn peek_space_sees_raw_whitespace() {
        let mut v = view("foo (2)");
        v.take();
        assert!(v.peek_space());

        let mut v = view("foo(2)");
        v.take();
        assert!(!v.peek_space());
    }

    #[test]
    fn space_follows_peek_checks_after_the_peeked_token() {
        let v = view("- 2");
        assert!(v.space_follows_peek());
        let v = view("-2");
        assert!(!v.space_follows_peek());
    }

    #[test]
    fn peek_nth_stays_on_the_line() {
        let v = view("a : 1\nb");
        assert_eq!(v.peek_nth(0).unwrap().text(), "a");
        assert_eq!(v.peek_nth(1).unwrap().text(), ":");
        assert_eq!(v.peek_nth(2).unwrap().text(), "1");
        assert!(v.peek_nth(3).is_none());
    }

    #[test]
    fn stash_restore_round_trip() {
        let mut v = view("a b c");
        let cp = v.stash();
        v.take();
        v.take();
        v.restore(cp);
        assert_eq!(v.take().unwrap().text(), "a");
    }
}
