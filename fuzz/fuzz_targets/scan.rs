// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for scanner crash safety and the totality invariant.
//!
//! Feeds arbitrary byte sequences to the scanner and asserts that it never
//! panics, and that every successful scan reproduces the input when the
//! token texts are concatenated.
//!
//! Invalid UTF-8 is converted via lossy conversion (U+FFFD replacement) so
//! the scanner still gets exercised with unusual character sequences.

#![no_main]

use kava_core::source_analysis::scan;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let source = String::from_utf8_lossy(data);
    if let Ok(tokens) = scan(&source) {
        let rebuilt: String = tokens.iter().map(|t| t.text().as_str()).collect();
        assert_eq!(rebuilt, source);
    }
});
