/// Message returned to callers when the request payload cannot be decoded.
pub const INVALID_INPUT_MESSAGE: &str = "Invalid input format. Could not parse input as JSON.";

/// Errors produced by the `stratus-core` crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// The request payload (or one of its nested string encodings) is not JSON.
    #[error("{INVALID_INPUT_MESSAGE}")]
    InvalidInput { reason: String },

    /// A code snippet could not be tokenized or parsed.
    #[error("invalid syntax (line {line}, column {column}): {reason}")]
    Syntax {
        line: usize,
        column: usize,
        reason: String,
    },
}
