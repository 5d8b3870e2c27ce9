// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Single-character predicates used by the scanner.
//!
//! Identifiers follow the scripting-language convention: `$`, `_`, ASCII
//! alphanumerics, and any character at or above U+007F. A digit may continue
//! an identifier but never start one.

/// Returns `true` if `c` may start an identifier.
#[must_use]
pub const fn is_identifier_start(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_' | '$') || c as u32 >= 0x7f
}

/// Returns `true` if `c` may continue an identifier.
#[must_use]
pub const fn is_identifier_continue(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

/// Returns `true` for horizontal whitespace (never `\n`).
#[must_use]
pub const fn is_inline_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r')
}

/// Returns `true` for a string literal delimiter.
#[must_use]
pub const fn is_quote(c: char) -> bool {
    matches!(c, '"' | '\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_start_classes() {
        assert!(is_identifier_start('a'));
        assert!(is_identifier_start('Z'));
        assert!(is_identifier_start('_'));
        assert!(is_identifier_start('$'));
        assert!(is_identifier_start('é'));
        assert!(is_identifier_start('\u{7f}'));
        assert!(!is_identifier_start('0'));
        assert!(!is_identifier_start('-'));
        assert!(!is_identifier_start(' '));
    }

    #[test]
    fn identifier_continue_allows_digits() {
        assert!(is_identifier_continue('0'));
        assert!(is_identifier_continue('9'));
        assert!(is_identifier_continue('x'));
        assert!(!is_identifier_continue('.'));
    }

    #[test]
    fn whitespace_excludes_newline() {
        assert!(is_inline_whitespace(' '));
        assert!(is_inline_whitespace('\t'));
        assert!(is_inline_whitespace('\r'));
        assert!(!is_inline_whitespace('\n'));
    }

    #[test]
    fn quotes() {
        assert!(is_quote('"'));
        assert!(is_quote('\''));
        assert!(!is_quote('`'));
    }
}
