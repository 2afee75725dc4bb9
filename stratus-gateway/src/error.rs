//! Error types for the gateway crate.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors raised before a request reaches the gate.
///
/// Anything the gate itself reports travels inside its response envelope
/// with status `200`.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The body is not JSON or lacks a required field.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        GatewayError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_maps_to_400() {
        let resp = GatewayError::InvalidRequest("missing field `input`".to_owned()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn display_includes_the_reason() {
        let err = GatewayError::InvalidRequest("missing field `tenant_id`".to_owned());
        assert_eq!(err.to_string(), "invalid request: missing field `tenant_id`");
    }
}
