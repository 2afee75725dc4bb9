//! Request decoding and the confirmation handshake.

use serde_json::Value;

use crate::error::CoreError;

/// `status` value signalling that the user confirmed the operation.
pub const CONFIRMED_STATUS: &str = "confirmation_succeeded";

/// `needs_confirmation` value signalling that no further confirmation is pending.
pub const CONFIRMATION_DONE: &str = "done";

/// Operation description used when the request does not carry one.
pub const DEFAULT_OPERATION: &str = "Unknown operation";

/// Decodes a request that may have been JSON-encoded several times.
///
/// Upstream text pipelines often hand over a JSON string whose content is
/// itself a JSON string. The value is re-parsed for as long as it is a string.
///
/// # Errors
/// Returns [`CoreError::InvalidInput`] if any decoding step fails.
pub fn decode_input(input: Value) -> Result<Value, CoreError> {
    let mut value = input;
    while let Value::String(text) = value {
        value = serde_json::from_str(&text)
            .map_err(|e| CoreError::InvalidInput { reason: e.to_string() })?;
    }
    Ok(value)
}

/// Returns `true` when both confirmation fields hold their exact sentinel values.
#[must_use]
pub fn is_confirmed(data: &Value) -> bool {
    data.get("status").and_then(Value::as_str) == Some(CONFIRMED_STATUS)
        && data.get("needs_confirmation").and_then(Value::as_str) == Some(CONFIRMATION_DONE)
}

/// The code carried by a confirmed request.
#[derive(Debug, Clone, PartialEq)]
pub enum CodePayload {
    /// One snippet. Not necessarily a string: the engine reports anything else.
    Single(Value),
    /// An ordered batch of snippets, executed in order.
    Batch(Vec<Value>),
}

/// A request that passed the confirmation handshake.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct OperationRequest {
    /// Free-form description echoed in every envelope.
    pub operation: String,
    /// The snippet or snippets to execute.
    pub code: CodePayload,
}

impl OperationRequest {
    /// Extracts the operation from decoded request data.
    ///
    /// Returns `None` when the handshake is incomplete, in which case the caller
    /// must echo the data back untouched.
    #[must_use]
    pub fn confirmed(data: &Value) -> Option<Self> {
        if !is_confirmed(data) {
            return None;
        }

        let operation = match data.get("operation") {
            None | Some(Value::Null) => DEFAULT_OPERATION.to_owned(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        };

        let code = match data.get("code") {
            None => CodePayload::Single(Value::String(String::new())),
            Some(Value::Array(snippets)) => CodePayload::Batch(snippets.clone()),
            Some(other) => CodePayload::Single(other.clone()),
        };

        Some(Self { operation, code })
    }
}
