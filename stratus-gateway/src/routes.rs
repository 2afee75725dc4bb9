//! Axum route handlers for the Stratus gateway API.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stratus_core::{CredentialBundle, ServiceKind, SUBSCRIPTION_ID_BINDING};
use stratus_executor::catalog::catalog;
use stratus_executor::{Connector, RequestGate};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::GatewayError;

// ── Request / response types ──────────────────────────────────────────────────

/// Body of `POST /v1/operations`.
///
/// `input` is handed to the gate untouched, so it may be a JSON object or a
/// string holding (possibly nested) encoded JSON.
#[derive(Debug, Deserialize)]
pub struct OperationBody {
    pub input: Value,
    #[serde(flatten)]
    pub credentials: CredentialBundle,
}

#[derive(Debug, Serialize)]
pub struct NamespaceResponse {
    pub bindings: Vec<ClientBinding>,
    pub subscription_binding: &'static str,
}

/// One client visible to snippets, with its operation groups.
#[derive(Debug, Serialize)]
pub struct ClientBinding {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub subscription_scoped: bool,
    pub operation_groups: Vec<OperationGroupListing>,
}

#[derive(Debug, Serialize)]
pub struct OperationGroupListing {
    pub name: &'static str,
    pub methods: Vec<&'static str>,
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router around `gate`.
pub fn create_router<C: Connector + 'static>(gate: Arc<RequestGate<C>>) -> Router {
    Router::new()
        .route("/v1/operations", post(execute_operation::<C>))
        .route("/v1/namespace", get(namespace))
        .route("/health", get(health))
        .with_state(gate)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /health`: liveness check.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}

/// `POST /v1/operations`: run a request through the gate.
///
/// Always answers `200` with the gate's response once the body parses,
/// including pass-through echoes and failure envelopes.
///
/// # Errors
/// Returns [`GatewayError::InvalidRequest`] if the body is not JSON or lacks
/// `input` or a credential field.
pub async fn execute_operation<C: Connector + 'static>(
    State(gate): State<Arc<RequestGate<C>>>,
    body: Result<Json<OperationBody>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(body) = body?;
    let response = gate.handle(body.input, &body.credentials).await;
    Ok(Json(Value::from(response)))
}

/// `GET /v1/namespace`: the bindings a snippet can use.
pub async fn namespace() -> impl IntoResponse {
    Json(namespace_listing())
}

fn namespace_listing() -> NamespaceResponse {
    let bindings = ServiceKind::ALL
        .into_iter()
        .map(|kind| {
            let services = catalog(kind);
            ClientBinding {
                name: kind.binding_name(),
                type_name: kind.type_name(),
                subscription_scoped: kind.is_subscription_scoped(),
                operation_groups: services
                    .groups()
                    .map(|group| OperationGroupListing {
                        name: group,
                        methods: services.methods(group).map(|spec| spec.method).collect(),
                    })
                    .collect(),
            }
        })
        .collect();

    NamespaceResponse {
        bindings,
        subscription_binding: SUBSCRIPTION_ID_BINDING,
    }
}
