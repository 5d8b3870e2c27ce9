// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the Kava scanner.
//!
//! These tests use `proptest` to verify scanner invariants over generated
//! inputs:
//!
//! 1. **Scanner never panics** — arbitrary input always returns a result
//! 2. **Totality** — for every successful scan, concatenating the token
//!    texts reproduces the input exactly
//! 3. **Spans are contiguous** — each token starts where the previous ended
//! 4. **Scanner is deterministic** — same input, same tokens
//! 5. **Valid fragments scan cleanly**
//! 6. **Layout markers are balanced and zero-width**

use proptest::prelude::*;

use super::scanner::{scan, scan_with_layout};
use super::token::{Token, TokenKind};

// ============================================================================
// Generators
// ============================================================================

/// Known-valid single-token fragments that must scan without errors.
const VALID_SINGLE_TOKENS: &[&str] = &[
    "42",
    "x",
    "$tmp",
    "\"hello\"",
    "'world'",
    "true",
    "false",
    "null",
    "undefined",
    "this",
    "@",
    "->",
    "=>",
    "++",
    "--",
    "...",
    "is",
    "isnt",
    "not",
    "+=",
    "|=",
    ">>>",
    "if",
    "unless",
    "return",
    "(",
    ")",
    "{",
    "}",
    ",",
    ";",
    ":",
    ".",
];

/// Multi-token expressions that must scan cleanly.
const VALID_EXPRESSIONS: &[&str] = &[
    "x + 1",
    "foo 1, 2",
    "foo = () ->\n  hello()\nhi()",
    "a = b:1, c:2",
    "x for x in xs",
    "if friday then jack else jill",
    "foo +2, b +3 | 0",
    "# a comment\na()",
    "s = \"with \\\" escape\"",
];

fn valid_single_token() -> impl Strategy<Value = String> {
    prop::sample::select(VALID_SINGLE_TOKENS).prop_map(std::string::ToString::to_string)
}

fn valid_expression() -> impl Strategy<Value = String> {
    prop::sample::select(VALID_EXPRESSIONS).prop_map(std::string::ToString::to_string)
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Property 1: the scanner never panics on arbitrary input.
    #[test]
    fn scanner_never_panics(input in "\\PC{0,500}") {
        let _result = scan(&input);
    }

    /// Property 2: concatenated token texts reproduce the input.
    #[test]
    fn scan_is_total(input in "\\PC{0,500}") {
        if let Ok(tokens) = scan(&input) {
            let rebuilt: String = tokens.iter().map(|t| t.text().as_str()).collect();
            prop_assert_eq!(rebuilt, input);
        }
    }

    /// Property 2b: totality holds for newline-heavy input too.
    #[test]
    fn scan_is_total_with_newlines(input in "[a-z0-9 \n\t#:,()+-]{0,200}") {
        if let Ok(tokens) = scan(&input) {
            let rebuilt: String = tokens.iter().map(|t| t.text().as_str()).collect();
            prop_assert_eq!(rebuilt, input);
        }
    }

    /// Property 3: token spans tile the input with no gaps or overlaps.
    #[test]
    fn token_spans_are_contiguous(input in "\\PC{0,300}") {
        if let Ok(tokens) = scan(&input) {
            let mut position = 0u32;
            for token in &tokens {
                prop_assert_eq!(token.span().start(), position);
                position = token.span().end();
            }
            prop_assert_eq!(position as usize, input.len());
        }
    }

    /// Property 4: the scanner is deterministic.
    #[test]
    fn scanner_is_deterministic(input in "\\PC{0,200}") {
        let first = scan(&input);
        let second = scan(&input);
        prop_assert_eq!(first, second);
    }

    /// Property 5: known-valid fragments scan without errors.
    #[test]
    fn valid_tokens_scan(input in valid_single_token()) {
        prop_assert!(scan(&input).is_ok(), "failed to scan {:?}", input);
    }

    /// Property 5b: known-valid expressions scan without errors.
    #[test]
    fn valid_expressions_scan(input in valid_expression()) {
        prop_assert!(scan(&input).is_ok(), "failed to scan {:?}", input);
    }

    /// Property 6: layout markers are balanced and never carry text.
    #[test]
    fn layout_markers_balanced(input in "[a-z \n]{0,200}") {
        if let Ok(tokens) = scan_with_layout(&input) {
            let starts = tokens
                .iter()
                .filter(|t| t.kind() == TokenKind::BlockStart)
                .count();
            let ends = tokens
                .iter()
                .filter(|t| t.kind() == TokenKind::BlockEnd)
                .count();
            prop_assert_eq!(starts, ends);
            for token in tokens.iter().filter(|t| t.kind().is_layout()) {
                prop_assert!(token.is_empty());
            }
            let rebuilt: String = tokens.iter().map(Token::text).map(|t| t.as_str()).collect();
            prop_assert_eq!(rebuilt, input);
        }
    }
}
