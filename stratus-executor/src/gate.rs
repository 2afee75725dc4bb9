//! The request gate: decode, check the confirmation handshake, dispatch.

use serde_json::Value;
use stratus_core::{decode_input, CodePayload, CredentialBundle, Envelope, GateResponse, OperationRequest};

use crate::backend::Connector;
use crate::engine::ExecutionEngine;

/// Front door of the dispatcher.
#[derive(Debug, Clone)]
pub struct RequestGate<C> {
    engine: ExecutionEngine<C>,
}

impl<C: Connector> RequestGate<C> {
    #[must_use]
    pub fn new(engine: ExecutionEngine<C>) -> Self {
        Self { engine }
    }

    #[must_use]
    pub fn engine(&self) -> &ExecutionEngine<C> {
        &self.engine
    }

    /// Handle one request.
    ///
    /// - Undecodable input yields the invalid-input envelope.
    /// - Input without the confirmation handshake is echoed back unchanged
    ///   and nothing runs.
    /// - A single snippet yields the engine's envelope as is.
    /// - A list of snippets runs them in order and collects each result (or
    ///   the failure envelope of a snippet that failed).
    pub async fn handle(&self, input: Value, bundle: &CredentialBundle) -> GateResponse {
        let data = match decode_input(input) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = ?e, "rejecting undecodable request");
                return GateResponse::Envelope(Envelope::InvalidInput { error: e.to_string() });
            }
        };

        let Some(request) = OperationRequest::confirmed(&data) else {
            tracing::debug!("confirmation handshake incomplete; passing request through");
            return GateResponse::PassThrough(data);
        };

        match request.code {
            CodePayload::Single(code) => {
                GateResponse::Envelope(self.engine.execute_snippet(&code, &request.operation, bundle).await)
            }
            CodePayload::Batch(snippets) => {
                tracing::info!(operation = %request.operation, snippets = snippets.len(), "executing batch");
                let mut results = Vec::with_capacity(snippets.len());
                for code in &snippets {
                    let envelope = self.engine.execute_snippet(code, &request.operation, bundle).await;
                    results.push(envelope.into_batch_item());
                }
                GateResponse::Envelope(Envelope::BatchCompleted {
                    operation: request.operation,
                    results,
                })
            }
        }
    }
}
