// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Scanning and parsing infrastructure for Kava source code.
//!
//! This module contains the scanner, the token model, the token view the
//! parser cursors over, the parser itself, and the error types.
//!
//! # Scanning
//!
//! [`Scanner`] (or the [`scan`] helper) turns source text into a flat token
//! vector that covers the input exactly — trivia and newlines included,
//! because the parser's indentation rules need them:
//!
//! ```
//! use kava_core::source_analysis::{TokenKind, scan};
//!
//! let tokens = scan("x + 1").unwrap();
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind()).collect();
//! assert_eq!(
//!     kinds,
//!     vec![
//!         TokenKind::Identifier,
//!         TokenKind::Whitespace,
//!         TokenKind::Operator,
//!         TokenKind::Whitespace,
//!         TokenKind::Number,
//!     ]
//! );
//! ```
//!
//! # Parsing
//!
//! [`Parser`] consumes the token vector through a [`TokenView`] and builds a
//! [`Block`](crate::ast::Block). Scanning fails fatally at the first
//! unmatched position; parsing aborts at the first hard error. See
//! [`ScanError`] and [`ParseError`].

mod chars;
mod error;
mod parser;
mod scanner;
mod span;
mod token;
mod view;

#[cfg(test)]
mod scanner_property_tests;

pub use error::{ParseError, ParseErrorKind, ScanError, SourceError};
pub use parser::Parser;
pub use scanner::{ScanCheckpoint, Scanner, scan, scan_with_layout};
pub use span::Span;
pub use token::{Token, TokenKind};
pub use view::{TokenView, ViewCheckpoint};
