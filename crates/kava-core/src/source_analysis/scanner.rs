// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for Kava source code.
//!
//! The scanner converts source text into a flat, ordered token vector that
//! covers the entire input: whitespace, comments, and newlines come through
//! as tokens rather than being dropped or attached as trivia, because the
//! parser's significant-indentation rules consume them explicitly.
//!
//! # Dispatch order
//!
//! At each position the scanner tries, in order:
//!
//! 1. The common table — a prioritized list of fixed spellings. Multi-char
//!    forms sit before their single-char prefixes (`++` before `+`, `...`
//!    before `.`), and spellings that end in an identifier character only
//!    match on a word boundary, so `returning` is one identifier rather than
//!    `return` + `ing`.
//! 2. Identifiers (`$`, `_`, alphanumerics, anything at or above U+007F;
//!    no leading digit).
//! 3. Integer literals.
//! 4. String literals (`"…"` or `'…'`, `\` escapes, single-line only).
//! 5. Comments (`#` to end of line).
//! 6. Horizontal whitespace.
//!
//! A lone `\n` becomes a [`TokenKind::Newline`]. Anything else is a fatal
//! [`ScanError`] at the offending position.
//!
//! # Invariant
//!
//! For every input that scans successfully, concatenating the `text` of the
//! resulting tokens reproduces the input exactly.

use tracing::trace;

use super::chars::{is_identifier_continue, is_identifier_start, is_inline_whitespace, is_quote};
use super::{ScanError, Span, Token, TokenKind};

/// The common table: fixed spellings in match-priority order.
///
/// Order matters twice over: a spelling must precede every spelling that is a
/// strict prefix of it, and the first match wins.
const COMMON_TABLE: &[(&str, TokenKind)] = &[
    ("...", TokenKind::Ellipsis),
    ("->", TokenKind::Func),
    ("=>", TokenKind::Func),
    ("==", TokenKind::Operator),
    ("=", TokenKind::AssignOp),
    ("++", TokenKind::UnaryMath),
    ("+=", TokenKind::AssignOp),
    ("+", TokenKind::Operator),
    ("--", TokenKind::UnaryMath),
    ("-=", TokenKind::AssignOp),
    ("-", TokenKind::Operator),
    ("*=", TokenKind::AssignOp),
    ("*", TokenKind::Operator),
    ("/=", TokenKind::AssignOp),
    ("/", TokenKind::Operator),
    ("^=", TokenKind::AssignOp),
    ("^", TokenKind::Operator),
    ("|=", TokenKind::AssignOp),
    ("|", TokenKind::Operator),
    ("!=", TokenKind::Operator),
    ("!", TokenKind::Unary),
    (">>>", TokenKind::Operator),
    (">>", TokenKind::Operator),
    (">=", TokenKind::Operator),
    (">", TokenKind::Operator),
    ("<<", TokenKind::Operator),
    ("<=", TokenKind::Operator),
    ("<", TokenKind::Operator),
    ("&", TokenKind::Operator),
    ("~", TokenKind::UnaryMath),
    ("isnt", TokenKind::Operator),
    ("is", TokenKind::Operator),
    ("not", TokenKind::Unary),
    ("return", TokenKind::Return),
    ("if", TokenKind::If),
    ("unless", TokenKind::Unless),
    ("then", TokenKind::Then),
    ("else", TokenKind::Else),
    ("for", TokenKind::For),
    ("until", TokenKind::Until),
    ("loop", TokenKind::Loop),
    ("in", TokenKind::In),
    ("of", TokenKind::Of),
    ("break", TokenKind::Break),
    ("continue", TokenKind::Continue),
    ("true", TokenKind::BuiltinPrimary),
    ("false", TokenKind::BuiltinPrimary),
    ("null", TokenKind::BuiltinPrimary),
    ("undefined", TokenKind::BuiltinPrimary),
    ("this", TokenKind::LongThis),
    ("@", TokenKind::ShortThis),
    ("(", TokenKind::LeftParen),
    (")", TokenKind::RightParen),
    ("{", TokenKind::LeftBrace),
    ("}", TokenKind::RightBrace),
    ("[", TokenKind::LeftBracket),
    ("]", TokenKind::RightBracket),
    (",", TokenKind::Comma),
    (";", TokenKind::Semicolon),
    (":", TokenKind::Colon),
    (".", TokenKind::Dot),
];

/// An opaque scanner position, for [`Scanner::stash`] / [`Scanner::rewind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanCheckpoint(usize);

/// A scanner over Kava source text.
///
/// The scanner borrows the source; token text is copied out into the tokens
/// so the result does not tie callers to the source's lifetime.
#[derive(Debug)]
pub struct Scanner<'src> {
    source: &'src str,
    position: usize,
}

impl<'src> Scanner<'src> {
    /// Creates a scanner over `source`, positioned at the start.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    /// Re-points the scanner at a new source, rewinding to the start.
    pub fn reset(&mut self, source: &'src str) {
        self.source = source;
        self.position = 0;
    }

    /// Captures the current position for a later [`Scanner::rewind`].
    #[must_use]
    pub fn stash(&self) -> ScanCheckpoint {
        ScanCheckpoint(self.position)
    }

    /// Restores a position captured by [`Scanner::stash`].
    pub fn rewind(&mut self, checkpoint: ScanCheckpoint) {
        self.position = checkpoint.0;
    }

    /// Scans the remaining input into a token vector.
    ///
    /// # Errors
    ///
    /// Fails at the first position where no rule matches, or on a string
    /// literal that never closes.
    pub fn scan(&mut self) -> Result<Vec<Token>, ScanError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        trace!(count = tokens.len(), "scanned token stream");
        Ok(tokens)
    }

    /// Scans in layout mode: the normal token stream, with zero-width
    /// [`TokenKind::BlockStart`] / [`TokenKind::BlockEnd`] markers inserted
    /// where a line's indentation opens or closes a block.
    ///
    /// The main parser ignores this mode and computes indentation itself;
    /// the markers exist for alternate drivers.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Scanner::scan`].
    pub fn scan_with_layout(&mut self) -> Result<Vec<Token>, ScanError> {
        let tokens = self.scan()?;
        Ok(insert_layout_markers(tokens))
    }

    fn rest(&self) -> &'src str {
        &self.source[self.position..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "source files over 4GB are not supported"
    )]
    fn span_from(&self, start: usize) -> Span {
        Span::new(start as u32, self.position as u32)
    }

    /// Consumes characters while the predicate holds.
    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        for c in self.rest().chars() {
            if !predicate(c) {
                break;
            }
            self.position += c.len_utf8();
        }
    }

    fn token_from(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(kind, &self.source[start..self.position], self.span_from(start))
    }

    /// Scans the next token, or `None` at end of input.
    fn next_token(&mut self) -> Result<Option<Token>, ScanError> {
        let start = self.position;
        let Some(c) = self.peek_char() else {
            return Ok(None);
        };

        if c == '\n' {
            self.position += 1;
            return Ok(Some(self.token_from(TokenKind::Newline, start)));
        }

        if let Some(token) = self.match_common_table(start) {
            return Ok(Some(token));
        }

        if is_identifier_start(c) {
            self.advance_while(is_identifier_continue);
            return Ok(Some(self.token_from(TokenKind::Identifier, start)));
        }

        if c.is_ascii_digit() {
            self.advance_while(|c| c.is_ascii_digit());
            return Ok(Some(self.token_from(TokenKind::Number, start)));
        }

        if is_quote(c) {
            return self.scan_string(start, c).map(Some);
        }

        if c == '#' {
            self.advance_while(|c| c != '\n');
            return Ok(Some(self.token_from(TokenKind::Comment, start)));
        }

        if is_inline_whitespace(c) {
            self.advance_while(is_inline_whitespace);
            return Ok(Some(self.token_from(TokenKind::Whitespace, start)));
        }

        self.position += c.len_utf8();
        Err(ScanError::unmatched(c, self.span_from(start)))
    }

    /// Tries the common table at the current position.
    ///
    /// Spellings that end in an identifier character only match on a word
    /// boundary; `islands` falls through to the identifier rule.
    fn match_common_table(&mut self, start: usize) -> Option<Token> {
        let rest = self.rest();
        for &(spelling, kind) in COMMON_TABLE {
            if !rest.starts_with(spelling) {
                continue;
            }
            let bounded = spelling
                .chars()
                .next_back()
                .is_some_and(is_identifier_continue);
            if bounded
                && rest[spelling.len()..]
                    .chars()
                    .next()
                    .is_some_and(is_identifier_continue)
            {
                continue;
            }
            self.position += spelling.len();
            return Some(self.token_from(kind, start));
        }
        None
    }

    /// Scans a string literal. `quote` is the opening delimiter; the close
    /// must be the same un-escaped character on the same line.
    fn scan_string(&mut self, start: usize, quote: char) -> Result<Token, ScanError> {
        self.position += quote.len_utf8();
        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    return Err(ScanError::unclosed_string(self.span_from(start)));
                }
                Some('\\') => {
                    self.position += 1;
                    match self.peek_char() {
                        None => {
                            return Err(ScanError::unclosed_string(self.span_from(start)));
                        }
                        Some(escaped) => self.position += escaped.len_utf8(),
                    }
                }
                Some(c) if c == quote => {
                    self.position += c.len_utf8();
                    return Ok(self.token_from(TokenKind::String, start));
                }
                Some(c) => self.position += c.len_utf8(),
            }
        }
    }
}

/// Scans `source` into a token vector.
///
/// # Errors
///
/// See [`Scanner::scan`].
pub fn scan(source: &str) -> Result<Vec<Token>, ScanError> {
    Scanner::new(source).scan()
}

/// Scans `source` in layout mode.
///
/// # Errors
///
/// See [`Scanner::scan_with_layout`].
pub fn scan_with_layout(source: &str) -> Result<Vec<Token>, ScanError> {
    Scanner::new(source).scan_with_layout()
}

/// Inserts zero-width block markers where line indentation shifts.
fn insert_layout_markers(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut stack: Vec<usize> = Vec::new();
    let mut at_line_start = true;
    let mut indent = 0usize;

    for token in tokens {
        match token.kind() {
            TokenKind::Newline => {
                at_line_start = true;
                indent = 0;
                out.push(token);
            }
            TokenKind::Whitespace if at_line_start => {
                indent += token.len();
                out.push(token);
            }
            TokenKind::Comment => out.push(token),
            _ => {
                if at_line_start {
                    at_line_start = false;
                    let here = Span::point(token.span().start());
                    match stack.last().copied() {
                        None => stack.push(indent),
                        Some(top) if indent > top => {
                            stack.push(indent);
                            out.push(Token::new(TokenKind::BlockStart, "", here));
                        }
                        Some(top) if indent < top => {
                            // The base frame is never popped; a line between
                            // two levels opens a fresh block at its column.
                            while stack.len() > 1 && stack.last().is_some_and(|&t| t > indent) {
                                stack.pop();
                                out.push(Token::new(TokenKind::BlockEnd, "", here));
                            }
                            if stack.last().is_some_and(|&t| t < indent) {
                                stack.push(indent);
                                out.push(Token::new(TokenKind::BlockStart, "", here));
                            }
                        }
                        Some(_) => {}
                    }
                }
                out.push(token);
            }
        }
    }

    let end = out.last().map_or(0, |t| t.span().end());
    while stack.len() > 1 {
        stack.pop();
        out.push(Token::new(TokenKind::BlockEnd, "", Span::point(end)));
    }
    out
}
