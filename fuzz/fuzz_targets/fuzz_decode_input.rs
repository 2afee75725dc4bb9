//! Fuzz target: request decoding and the confirmation handshake.
//!
//! Arbitrary text is fed to `decode_input` as the string-encoded request,
//! then through the handshake check. Neither may panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::Value;
use stratus_core::{decode_input, OperationRequest};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(decoded) = decode_input(Value::String(text.to_owned())) {
        let _ = OperationRequest::confirmed(&decoded);
    }
});
