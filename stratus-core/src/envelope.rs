//! The closed set of response shapes returned to callers.

use serde::{Serialize, Serializer};
use serde_json::{json, Value};

/// Result reported when a snippet never binds `result`.
pub const NO_RESULT_SENTINEL: &str = "No 'result' variable was defined.";

/// `next_step` hint for a successful single snippet.
pub const NEXT_STEP_COMPLETED: &str = "Operation executed successfully";

/// `next_step` hint for a batch of snippets.
pub const NEXT_STEP_BATCH_COMPLETED: &str = "Executed all code snippets successfully";

/// `next_step` hint for a failed snippet.
pub const NEXT_STEP_FAILED: &str = "Error during execution";

/// Value of the `status` tag on execution envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ExecutionStatus {
    /// The snippet (or every snippet of a batch) ran.
    OperationCompleted,
    /// The snippet raised before producing a result.
    ExecutionFailed,
}

impl ExecutionStatus {
    /// Wire form of the tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OperationCompleted => "operation_completed",
            Self::ExecutionFailed => "execution_failed",
        }
    }
}

/// A response envelope.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Envelope {
    /// The request could not be decoded.
    InvalidInput { error: String },
    /// A snippet failed somewhere between authentication and normalization.
    Failed { operation: String, error: String },
    /// A single snippet ran; `result` is already JSON-safe.
    Completed { operation: String, result: Value },
    /// A batch of snippets ran, results in input order.
    BatchCompleted { operation: String, results: Vec<Value> },
}

impl Envelope {
    /// The `status` tag, absent on the input-error shape.
    #[must_use]
    pub fn status(&self) -> Option<ExecutionStatus> {
        match self {
            Self::InvalidInput { .. } => None,
            Self::Failed { .. } => Some(ExecutionStatus::ExecutionFailed),
            Self::Completed { .. } | Self::BatchCompleted { .. } => {
                Some(ExecutionStatus::OperationCompleted)
            }
        }
    }

    /// The item a batch collects for this outcome: the `result` when there is
    /// one, otherwise the whole envelope.
    #[must_use]
    pub fn into_batch_item(self) -> Value {
        match self {
            Self::Completed { result, .. } => result,
            other => Value::from(other),
        }
    }
}

impl From<Envelope> for Value {
    fn from(envelope: Envelope) -> Self {
        let status = envelope.status().map(ExecutionStatus::as_str);
        match envelope {
            Envelope::InvalidInput { error } => json!({ "error": error }),
            Envelope::Failed { operation, error } => json!({
                "status": status,
                "operation": operation,
                "error": error,
                "next_step": NEXT_STEP_FAILED,
            }),
            Envelope::Completed { operation, result } => json!({
                "status": status,
                "operation": operation,
                "result": result,
                "next_step": NEXT_STEP_COMPLETED,
            }),
            Envelope::BatchCompleted { operation, results } => json!({
                "status": status,
                "operation": operation,
                "results": results,
                "next_step": NEXT_STEP_BATCH_COMPLETED,
            }),
        }
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Value::from(self.clone()).serialize(serializer)
    }
}

/// What the request gate hands back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GateResponse {
    /// One of the envelope shapes.
    Envelope(Envelope),
    /// The decoded request, echoed because the handshake is incomplete.
    PassThrough(Value),
}

impl From<GateResponse> for Value {
    fn from(response: GateResponse) -> Self {
        match response {
            GateResponse::Envelope(envelope) => envelope.into(),
            GateResponse::PassThrough(data) => data,
        }
    }
}
