//! Fuzz target: snippet lexing and parsing.
//!
//! Malformed code must come back as a syntax error, never a panic or a
//! runaway recursion.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(code) = std::str::from_utf8(data) {
        let _ = stratus_core::snippet::parse(code);
    }
});
