//! The execution engine: one snippet in, one envelope out.

use std::sync::Arc;

use serde_json::Value;
use sha2::{Digest, Sha256};
use stratus_core::snippet::parse;
use stratus_core::{CredentialBundle, Envelope, NO_RESULT_SENTINEL, RESULT_BINDING};

use crate::backend::Connector;
use crate::credential::{ClientSecretCredential, TokenCredential};
use crate::interpreter::Interpreter;
use crate::normalize::normalize;
use crate::registry::ClientRegistry;
use crate::ExecutorError;

/// Runs snippets against a freshly built client registry.
///
/// Every call authenticates and constructs all clients from scratch; nothing
/// is shared between calls except the connector.
#[derive(Debug, Clone)]
pub struct ExecutionEngine<C> {
    connector: C,
}

impl<C: Connector> ExecutionEngine<C> {
    #[must_use]
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    #[must_use]
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Execute `code` and wrap the outcome.
    ///
    /// Never fails: every error is reported as an `execution_failed`
    /// envelope carrying the error's text.
    pub async fn execute(&self, code: &str, operation: &str, bundle: &CredentialBundle) -> Envelope {
        let fingerprint = fingerprint(code);
        tracing::info!(operation, snippet = %fingerprint, "executing snippet");

        match self.try_execute(code, bundle).await {
            Ok(result) => {
                tracing::info!(operation, snippet = %fingerprint, "snippet completed");
                Envelope::Completed {
                    operation: operation.to_owned(),
                    result,
                }
            }
            Err(e) => {
                tracing::warn!(operation, snippet = %fingerprint, error = %e, "snippet failed");
                Envelope::Failed {
                    operation: operation.to_owned(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Execute a code payload taken straight from a request; non-string
    /// payloads fail without touching the network.
    pub async fn execute_snippet(&self, code: &Value, operation: &str, bundle: &CredentialBundle) -> Envelope {
        match code {
            Value::String(code) => self.execute(code, operation, bundle).await,
            other => Envelope::Failed {
                operation: operation.to_owned(),
                error: ExecutorError::InvalidSnippet { found: json_type(other) }.to_string(),
            },
        }
    }

    async fn try_execute(&self, code: &str, bundle: &CredentialBundle) -> Result<Value, ExecutorError> {
        let credential = self.credential(bundle)?;
        let registry = ClientRegistry::build(&credential, &bundle.subscription_id, &self.connector)?;

        let script = parse(code)?;
        let mut interpreter = Interpreter::new(registry.namespace());
        interpreter.run(&script).await?;

        match interpreter.take(RESULT_BINDING) {
            Some(result) => normalize(result).await,
            None => Ok(Value::String(NO_RESULT_SENTINEL.to_owned())),
        }
    }

    fn credential(&self, bundle: &CredentialBundle) -> Result<Arc<dyn TokenCredential>, ExecutorError> {
        let transport = self
            .connector
            .transport()
            .map_err(|e| ExecutorError::ClientConstruction {
                client: "ClientSecretCredential",
                reason: e.to_string(),
            })?;
        Ok(Arc::new(ClientSecretCredential::new(
            bundle,
            &self.connector.config().authority_host,
            transport,
        )))
    }
}

/// Short SHA-256 fingerprint that identifies a snippet in logs without
/// revealing it.
#[must_use]
pub fn fingerprint(code: &str) -> String {
    let digest = Sha256::digest(code.as_bytes());
    digest.iter().take(8).map(|b| format!("{b:02x}")).collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use stratus_core::ExecutionStatus;

    use super::*;
    use crate::http::HttpMethod;
    use crate::testing::{json_response, test_bundle, MockConnector, TEST_SUBSCRIPTION};

    fn rg_list_path() -> String {
        format!("/subscriptions/{TEST_SUBSCRIPTION}/resourcegroups")
    }

    fn connector_with_groups() -> MockConnector {
        let connector = MockConnector::new();
        connector.mock().route(
            HttpMethod::Get,
            &rg_list_path(),
            json_response(200, &json!({
                "value": [
                    {"id": "/subscriptions/s/resourceGroups/rg1", "name": "rg1", "location": "westeurope",
                     "properties": {"provisioningState": "Succeeded"}, "tags": {"env": "dev"}},
                    {"id": "/subscriptions/s/resourceGroups/rg2", "name": "rg2", "location": "eastus",
                     "properties": {"provisioningState": "Succeeded"}},
                ],
            })),
        );
        connector
    }

    #[tokio::test]
    async fn lists_resource_groups_into_plain_mappings() {
        let engine = ExecutionEngine::new(connector_with_groups());
        let envelope = engine
            .execute("result = resource_client.resource_groups.list()", "list RGs", &test_bundle())
            .await;

        assert_eq!(
            Value::from(envelope),
            json!({
                "status": "operation_completed",
                "operation": "list RGs",
                "result": [
                    {"id": "/subscriptions/s/resourceGroups/rg1", "name": "rg1", "location": "westeurope",
                     "properties": {"provisioning_state": "Succeeded"}, "tags": {"env": "dev"}},
                    {"id": "/subscriptions/s/resourceGroups/rg2", "name": "rg2", "location": "eastus",
                     "properties": {"provisioning_state": "Succeeded"}},
                ],
                "next_step": "Operation executed successfully",
            })
        );
    }

    #[tokio::test]
    async fn undefined_client_fails_with_name_error() {
        let engine = ExecutionEngine::new(MockConnector::new());
        let envelope = engine
            .execute("result = missing_client.list()", "op", &test_bundle())
            .await;
        assert_eq!(envelope.status(), Some(ExecutionStatus::ExecutionFailed));
        assert_eq!(
            Value::from(envelope)["error"],
            "name 'missing_client' is not defined"
        );
    }

    #[tokio::test]
    async fn missing_result_yields_sentinel() {
        let engine = ExecutionEngine::new(MockConnector::new());
        let envelope = engine.execute("x = 1", "op", &test_bundle()).await;
        assert_eq!(
            Value::from(envelope)["result"],
            "No 'result' variable was defined."
        );
    }

    #[tokio::test]
    async fn subscription_id_is_bound() {
        let engine = ExecutionEngine::new(MockConnector::new());
        let envelope = engine.execute("result = subscriptionId", "op", &test_bundle()).await;
        assert_eq!(Value::from(envelope)["result"], TEST_SUBSCRIPTION);
    }

    #[tokio::test]
    async fn every_execution_rebuilds_credential_and_clients() {
        let connector = MockConnector::new();
        let engine = ExecutionEngine::new(connector.clone());
        for _ in 0..2 {
            let envelope = engine.execute("result = 1", "op", &test_bundle()).await;
            assert_eq!(envelope.status(), Some(ExecutionStatus::OperationCompleted));
        }
        assert_eq!(connector.transports_built(), 42);
    }

    #[tokio::test]
    async fn http_errors_carry_arm_code_and_message() {
        let connector = MockConnector::new();
        connector.mock().route(
            HttpMethod::Get,
            &format!("{}/ghost", rg_list_path()),
            json_response(404, &json!({"error": {"code": "ResourceGroupNotFound", "message": "Resource group 'ghost' could not be found."}})),
        );
        let engine = ExecutionEngine::new(connector);
        let envelope = engine
            .execute("result = resource_client.resource_groups.get('ghost')", "op", &test_bundle())
            .await;
        assert_eq!(
            Value::from(envelope)["error"],
            "(ResourceGroupNotFound) Resource group 'ghost' could not be found."
        );
    }

    #[tokio::test]
    async fn construction_failure_is_reported() {
        let engine = ExecutionEngine::new(MockConnector::new().failing_after(0));
        let envelope = engine.execute("result = 1", "op", &test_bundle()).await;
        let error = Value::from(envelope)["error"].clone();
        assert!(
            error.as_str().is_some_and(|e| e.starts_with("failed to construct ClientSecretCredential")),
            "got {error}"
        );
    }

    #[tokio::test]
    async fn non_string_code_fails_without_network() {
        let connector = MockConnector::new();
        let engine = ExecutionEngine::new(connector.clone());
        let envelope = engine.execute_snippet(&json!(42), "op", &test_bundle()).await;
        assert_eq!(
            Value::from(envelope)["error"],
            "code snippet must be a string, not int"
        );
        assert_eq!(connector.transports_built(), 0);
    }

    #[tokio::test]
    async fn empty_code_yields_sentinel() {
        let engine = ExecutionEngine::new(MockConnector::new());
        let envelope = engine.execute("", "op", &test_bundle()).await;
        assert_eq!(Value::from(envelope)["result"], NO_RESULT_SENTINEL);
    }

    #[tokio::test]
    async fn long_subscript_chain_under_the_nesting_limit_evaluates() {
        let mut code = String::from("d = {'n': 1}\n");
        code.push_str(&"d = {'n': d}\n".repeat(90));
        code.push_str(&format!("result = d{}", "['n']".repeat(90)));

        let engine = ExecutionEngine::new(MockConnector::new());
        let envelope = engine.execute(&code, "op", &test_bundle()).await;
        assert_eq!(Value::from(envelope)["result"], 1);
    }

    #[tokio::test]
    async fn overlong_attribute_chain_fails_as_syntax_error() {
        let engine = ExecutionEngine::new(MockConnector::new());
        for depth in [150, 8000] {
            let code = format!("result = subscriptionId{}", ".upper".repeat(depth));
            let envelope = engine.execute(&code, "op", &test_bundle()).await;
            assert_eq!(envelope.status(), Some(ExecutionStatus::ExecutionFailed));
            let error = Value::from(envelope)["error"].clone();
            assert!(
                error.as_str().is_some_and(|e| e.starts_with("invalid syntax") && e.ends_with("too many nested expressions")),
                "got {error}"
            );
        }
    }

    #[test]
    fn fingerprint_is_stable_and_short() {
        assert_eq!(fingerprint("result = 1"), fingerprint("result = 1"));
        assert_ne!(fingerprint("result = 1"), fingerprint("result = 2"));
        assert_eq!(fingerprint("").len(), 16);
    }
}
