// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for parser crash safety.
//!
//! Feeds arbitrary byte sequences through the scan-then-parse pipeline and
//! asserts that it never panics: every input produces either a block or an
//! error value. Deeply nested input must not overflow the stack.

#![no_main]

use kava_core::parse_source;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let source = String::from_utf8_lossy(data);
    let _result = parse_source(&source);
});
