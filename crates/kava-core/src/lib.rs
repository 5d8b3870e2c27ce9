// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Kava language front-end.
//!
//! This crate contains the core of the Kava compiler front-end:
//! - Lexical analysis (a scanner that preserves whitespace and newlines)
//! - Parsing (recursive descent with Pratt operator precedence and
//!   cooperative backtracking over significant indentation)
//! - AST definitions
//! - Unparsing (canonical and normalized re-emission)
//! - A partial numeric evaluator for debugging and tests
//!
//! The usual entry point is [`parse_source`]:
//!
//! ```
//! use kava_core::parse_source;
//! use kava_core::unparse::emit_common;
//!
//! let block = parse_source("foo = () ->\n  hello()\nhi()").unwrap();
//! assert_eq!(emit_common(&block), "foo = () -> {hello()};hi()");
//! ```

pub mod ast;
pub mod eval;
pub mod source_analysis;
pub mod unparse;

use ast::Block;
use source_analysis::{Parser, SourceError, scan};

/// Scans and parses a source string into its root block.
///
/// # Errors
///
/// Returns a [`SourceError`] wrapping the scanner or parser failure.
///
/// # Examples
///
/// ```
/// use kava_core::parse_source;
///
/// let block = parse_source("1 + 2 * 3").unwrap();
/// assert_eq!(block.expressions.len(), 1);
///
/// assert!(parse_source("\"unterminated").is_err());
/// ```
pub fn parse_source(source: &str) -> Result<Block, SourceError> {
    let tokens = scan(source)?;
    let block = Parser::new(tokens).parse()?;
    Ok(block)
}

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::ast::{Block, Expression, Identifier};
    pub use crate::eval::debug_eval;
    pub use crate::parse_source;
    pub use crate::source_analysis::{
        ParseError, Parser, ScanError, Scanner, SourceError, Span, Token, TokenKind, scan,
    };
    pub use crate::unparse::{emit, emit_common};
}
