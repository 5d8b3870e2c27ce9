// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the Kava parser.
//!
//! These tests use `proptest` to verify parser invariants over generated
//! inputs:
//!
//! 1. **Parser never panics** — arbitrary input always returns a result
//! 2. **Error spans are in bounds**
//! 3. **Common emit is deterministic** for everything that parses
//! 4. **Common emit is idempotent on flat input** — re-parsing the emitted
//!    form reproduces it (indent-significant surface forms are normalized
//!    away by the first emit, so the second round trip is exact)

use proptest::prelude::*;

use crate::source_analysis::{Parser, scan};
use crate::unparse::emit_common;

// ============================================================================
// Generators
// ============================================================================

/// Near-valid Kava fragments. Most parse; a few are intentionally broken to
/// exercise the error paths.
const FRAGMENTS: &[&str] = &[
    "42",
    "x",
    "x = 42",
    "x += 1",
    "a = b = 1",
    "1 + 2 * 3",
    "(1 + 2) * 3",
    "a | b < c",
    "foo()",
    "foo 1, 2",
    "foo +2, b +3 | 0",
    "foo(xs...)",
    "(foo 1, 2)",
    "foo x if y",
    "x() if ready",
    "x for x in xs",
    "x for x in xs for xs in list",
    "a = b:1, c:2",
    "a = {b: 1, c: 2}",
    "if friday then jack else jill",
    "unless busy then play()",
    "loop then tick()",
    "until done then tick()",
    "for x in xs then use(x)",
    "f = (a, b = 2, rest...) -> a + b",
    "foo = () ->\n  hello()\nhi()",
    "a =\n  hello:\n    world: 2",
    "@x = this.y",
    "return",
    "not ready",
    "i++",
    // Intentionally malformed:
    "foo\n  20",
    "a )",
    "for 2*x in arr then x",
    "if x",
];

fn fragment() -> impl Strategy<Value = String> {
    prop::sample::select(FRAGMENTS).prop_map(std::string::ToString::to_string)
}

/// Two fragments joined as separate lines; still near-valid.
fn fragment_pair() -> impl Strategy<Value = String> {
    (fragment(), fragment()).prop_map(|(a, b)| format!("{a}\n{b}"))
}

fn parse_text(source: &str) -> Option<crate::ast::Block> {
    let tokens = scan(source).ok()?;
    Parser::new(tokens).parse().ok()
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Property 1: the parser never panics on arbitrary input.
    #[test]
    fn parser_never_panics(input in "\\PC{0,300}") {
        if let Ok(tokens) = scan(&input) {
            let _result = Parser::new(tokens).parse();
        }
    }

    /// Property 1b: nor on newline/indent-heavy near-source input.
    #[test]
    fn parser_never_panics_on_indented_input(input in "[a-z0-9 \n():,=+-]{0,200}") {
        if let Ok(tokens) = scan(&input) {
            let _result = Parser::new(tokens).parse();
        }
    }

    /// Property 1c: nor on stitched-together fragments.
    #[test]
    fn parser_never_panics_on_fragments(input in fragment_pair()) {
        if let Ok(tokens) = scan(&input) {
            let _result = Parser::new(tokens).parse();
        }
    }

    /// Property 2: hard errors point inside the input.
    #[test]
    fn error_spans_in_bounds(input in fragment_pair()) {
        if let Ok(tokens) = scan(&input) {
            if let Err(error) = Parser::new(tokens).parse() {
                if let Some(span) = error.span {
                    prop_assert!(span.end() as usize <= input.len());
                    prop_assert!(span.start() <= span.end());
                }
            }
        }
    }

    /// Property 3: common emit is deterministic.
    #[test]
    fn common_emit_deterministic(input in fragment()) {
        if let Some(block) = parse_text(&input) {
            let first = emit_common(&block);
            let second = emit_common(&block);
            prop_assert_eq!(first, second);
        }
    }

    /// Property 4: re-parsing a common emit reproduces it.
    #[test]
    fn common_emit_idempotent(input in fragment()) {
        if let Some(block) = parse_text(&input) {
            let once = emit_common(&block);
            if let Some(reparsed) = parse_text(&once) {
                prop_assert_eq!(emit_common(&reparsed), once);
            }
        }
    }
}
