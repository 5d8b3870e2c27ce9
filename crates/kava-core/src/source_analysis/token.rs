// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Token types for Kava lexical analysis.
//!
//! This module defines the tokens produced by the scanner. Unlike many
//! lexers, the scanner keeps whitespace, comments, and newlines as ordinary
//! tokens in the stream: the parser's significant-indentation rules need to
//! see them, and the token view (not the scanner) decides what to skip.
//!
//! # Token Structure
//!
//! Each token consists of:
//! - A [`TokenKind`] indicating the type of token
//! - The exact source slice it matched (so that concatenating the `text` of
//!   all tokens reproduces the input byte-for-byte)
//! - A [`Span`] indicating its location in source

use ecow::EcoString;

use super::Span;

/// The kind of token, not including its matched text or source location.
///
/// Fixed spellings (keywords, operators, punctuation) are classified by the
/// scanner's common table; the token's [`Token::text`] keeps the concrete
/// spelling, which the parser uses to tell `->` from `=>` or `+=` from `-=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // === Trivia ===
    /// One or more spaces/tabs, never spanning a newline.
    Whitespace,
    /// A line comment, `#` to end of line (newline excluded).
    Comment,

    // === Structural ===
    /// A single `\n`.
    Newline,
    /// Synthetic block-open marker, produced only by the layout scan mode.
    BlockStart,
    /// Synthetic block-close marker, produced only by the layout scan mode.
    BlockEnd,

    // === Atoms ===
    /// An identifier: `foo`, `$tmp`, `naïve`.
    Identifier,
    /// An integer literal: `42`.
    Number,
    /// A quoted string literal, delimiters included in the text.
    String,

    // === Keyword / operator classes ===
    /// A binary operator: `+ - * / | ^ & << >> >>> == != >= <= > < is isnt`.
    Operator,
    /// An assignment operator: `= += -= *= /= ^= |=`.
    AssignOp,
    /// A prefix-only unary operator: `!`, `not`.
    Unary,
    /// A unary math operator: `++`, `--`, `~` (prefix; `++`/`--` also postfix).
    UnaryMath,
    /// A function arrow, `->` or `=>`.
    Func,
    /// The `return` keyword.
    Return,
    /// The `if` keyword (statement head or postfix operator).
    If,
    /// The `unless` keyword (statement head or postfix operator).
    Unless,
    /// The `then` keyword.
    Then,
    /// The `else` keyword.
    Else,
    /// The `for` keyword.
    For,
    /// The `until` keyword.
    Until,
    /// The `loop` keyword.
    Loop,
    /// The `in` keyword.
    In,
    /// The `of` keyword.
    Of,
    /// The `break` keyword.
    Break,
    /// The `continue` keyword.
    Continue,
    /// A builtin primary: `true`, `false`, `null`, `undefined`.
    BuiltinPrimary,
    /// The `@` shorthand for the receiver.
    ShortThis,
    /// The `this` keyword.
    LongThis,

    // === Punctuation ===
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `:`
    Colon,
    /// `.`
    Dot,
    /// `...`
    Ellipsis,
}

impl TokenKind {
    /// Returns `true` if this token is trivia (whitespace or comment).
    ///
    /// Newlines are structural, not trivia: the parser consumes them
    /// explicitly when computing indentation.
    #[must_use]
    pub const fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace | Self::Comment)
    }

    /// Returns `true` for the synthetic layout markers.
    #[must_use]
    pub const fn is_layout(self) -> bool {
        matches!(self, Self::BlockStart | Self::BlockEnd)
    }

    /// Returns `true` if this token can be an object-literal key.
    #[must_use]
    pub const fn is_object_key(self) -> bool {
        matches!(self, Self::Identifier | Self::Number | Self::String)
    }

    /// Returns `true` if this token can open a prefix unary expression.
    #[must_use]
    pub const fn is_unary_class(self) -> bool {
        matches!(self, Self::Unary | Self::UnaryMath)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Whitespace => "whitespace",
            Self::Comment => "comment",
            Self::Newline => "newline",
            Self::BlockStart => "block start",
            Self::BlockEnd => "block end",
            Self::Identifier => "identifier",
            Self::Number => "number",
            Self::String => "string",
            Self::Operator => "operator",
            Self::AssignOp => "assignment operator",
            Self::Unary | Self::UnaryMath => "unary operator",
            Self::Func => "function arrow",
            Self::Return => "return",
            Self::If => "if",
            Self::Unless => "unless",
            Self::Then => "then",
            Self::Else => "else",
            Self::For => "for",
            Self::Until => "until",
            Self::Loop => "loop",
            Self::In => "in",
            Self::Of => "of",
            Self::Break => "break",
            Self::Continue => "continue",
            Self::BuiltinPrimary => "builtin",
            Self::ShortThis => "@",
            Self::LongThis => "this",
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::LeftBrace => "{",
            Self::RightBrace => "}",
            Self::LeftBracket => "[",
            Self::RightBracket => "]",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Colon => ":",
            Self::Dot => ".",
            Self::Ellipsis => "...",
        };
        f.write_str(name)
    }
}

/// A token: kind, exact matched text, and source location.
///
/// Tokens are cheap to clone ([`EcoString`] text), which matters because the
/// parser snapshots and restores freely while backtracking.
///
/// # Examples
///
/// ```
/// use kava_core::source_analysis::{Span, Token, TokenKind};
///
/// let token = Token::new(TokenKind::Identifier, "foo", Span::new(0, 3));
/// assert_eq!(token.kind(), TokenKind::Identifier);
/// assert_eq!(token.text(), "foo");
/// assert_eq!(token.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    text: EcoString,
    span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<EcoString>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Returns the kind of this token.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Returns the exact source slice this token matched.
    #[must_use]
    pub fn text(&self) -> &EcoString {
        &self.text
    }

    /// Returns the number of source bytes this token consumed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns `true` for zero-width tokens (layout markers only).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns the source span of this token.
    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    /// Returns `true` if the token's text equals `s`.
    #[must_use]
    pub fn is(&self, s: &str) -> bool {
        self.text == s
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Newline => f.write_str("newline"),
            TokenKind::BlockStart | TokenKind::BlockEnd => write!(f, "{}", self.kind),
            _ => write!(f, "'{}'", self.text),
        }
    }
}
