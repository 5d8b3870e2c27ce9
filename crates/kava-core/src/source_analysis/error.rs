// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Error types for the Kava front-end.
//!
//! Errors carry source locations ([`Span`]) for precise diagnostics.
//! They integrate with [`miette`] for labeled source-window reporting.
//!
//! Scanning fails fatally at the first unmatched position; parsing aborts at
//! the first hard error. Speculative parser rules never surface here — they
//! restore the parser snapshot and report `None` to their caller instead.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use super::Span;

/// A lexical error. The scanner stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ScanError {
    /// No scan rule matched at this position.
    #[error("no rule matches '{found}'")]
    UnmatchedInput {
        /// The character nothing matched.
        found: char,
        /// Where the scanner stopped.
        #[label("cannot scan this")]
        at: Span,
    },

    /// A string literal ran into a newline or the end of input before its
    /// closing quote.
    #[error("string literal is missing its closing quote")]
    UnclosedString {
        /// From the opening quote to where scanning gave up.
        #[label("opened here")]
        at: Span,
    },
}

impl ScanError {
    /// Creates a "no rule matches" error.
    #[must_use]
    pub fn unmatched(found: char, at: Span) -> Self {
        Self::UnmatchedInput { found, at }
    }

    /// Creates an unclosed-string error.
    #[must_use]
    pub fn unclosed_string(at: Span) -> Self {
        Self::UnclosedString { at }
    }

    /// The source position the scanner stopped at.
    #[must_use]
    pub fn at(&self) -> Span {
        match self {
            Self::UnmatchedInput { at, .. } | Self::UnclosedString { at } => *at,
        }
    }
}

/// A syntax error encountered during parsing.
///
/// The span is the position of the offending token when one is available;
/// errors raised at end of input carry no span.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{kind}")]
#[diagnostic()]
pub struct ParseError {
    /// The kind of syntax error.
    #[source]
    pub kind: ParseErrorKind,
    /// The source location of the error, when known.
    #[label("here")]
    pub span: Option<Span>,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, span: Option<Span>) -> Self {
        Self { kind, span }
    }
}

/// The kind of syntax error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A rule consumed a token it did not expect.
    #[error("unexpected {0}")]
    UnexpectedToken(EcoString),

    /// A rule expected a specific follow-token.
    #[error("expected {expected}, found {found}")]
    ExpectedToken {
        /// What the rule needed next.
        expected: EcoString,
        /// What was actually there.
        found: EcoString,
    },

    /// An indentation rule was violated.
    #[error("{0}")]
    IndentError(EcoString),

    /// A construct that requires a body got none.
    #[error("empty block in {0}")]
    EmptyBlock(EcoString),

    /// An operator without a defined priority reached the expression parser.
    #[error("undefined operator priority for '{0}'")]
    PrecedenceError(EcoString),

    /// Tokens remained after a complete parse.
    #[error("leftover input after expression: {0}")]
    Leftover(EcoString),
}

/// Any error from the scan-then-parse pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SourceError {
    /// The scanner rejected the input.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Scan(#[from] ScanError),

    /// The parser rejected the token stream.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),
}
