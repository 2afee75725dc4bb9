//! Fuzz target: JSON deserialization of the gateway's `OperationBody`.

#![no_main]

use libfuzzer_sys::fuzz_target;
use stratus_gateway::routes::OperationBody;

fuzz_target!(|data: &[u8]| {
    let _ = serde_json::from_slice::<OperationBody>(data);
});
