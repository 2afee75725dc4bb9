//! Authenticated request pipeline for Resource Manager calls.

use std::fmt;
use std::sync::Arc;

use reqwest::Url;
use serde_json::Value;

use crate::backend::Transport;
use crate::credential::TokenCredential;
use crate::http::{join_segments, HttpMethod, HttpRequest, HttpResponse, RequestBody};
use crate::ExecutorError;

/// Fallback error code when a failure response carries no ARM error body.
const GENERIC_ERROR_CODE: &str = "HttpResponseError";

/// Adds authentication and tracing headers to every request a client sends
/// and turns failure responses into [`ExecutorError::HttpResponse`].
pub struct ArmPipeline {
    credential: Arc<dyn TokenCredential>,
    transport: Arc<dyn Transport>,
    endpoint: String,
    scope: String,
}

impl ArmPipeline {
    #[must_use]
    pub fn new(
        credential: Arc<dyn TokenCredential>,
        transport: Arc<dyn Transport>,
        endpoint: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            credential,
            transport,
            endpoint: endpoint.into(),
            scope: scope.into(),
        }
    }

    /// Resolve path segments and query pairs against the endpoint.
    ///
    /// # Errors
    /// Returns [`ExecutorError::InvalidUrl`] if the endpoint is not a valid
    /// base URL.
    pub fn url<S: AsRef<str>>(&self, segments: &[S], query: &[(&str, String)]) -> Result<Url, ExecutorError> {
        let mut url = join_segments(&self.endpoint, segments)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Send an authenticated request and return the response whatever its
    /// status.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Authentication`] if no token can be obtained,
    /// or [`ExecutorError::Transport`] if the request fails to complete.
    pub async fn send_raw(&self, method: HttpMethod, url: Url, body: RequestBody) -> Result<HttpResponse, ExecutorError> {
        let token = self.credential.get_token(&self.scope).await?;
        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::debug!(%method, url = %url, request_id = %request_id, "sending request");
        let request = HttpRequest::new(method, url)
            .header("Authorization", format!("Bearer {}", token.token))
            .header("Accept", "application/json")
            .header("x-ms-client-request-id", request_id)
            .body(body);

        let response = self.transport.send(request).await?;
        tracing::debug!(status = response.status, "received response");
        Ok(response)
    }

    /// Like [`ArmPipeline::send_raw`], but non-2xx responses are errors.
    ///
    /// # Errors
    /// Returns [`ExecutorError::HttpResponse`] for failure statuses, in
    /// addition to the errors of [`ArmPipeline::send_raw`].
    pub async fn send(&self, method: HttpMethod, url: Url, body: RequestBody) -> Result<HttpResponse, ExecutorError> {
        let response = self.send_raw(method, url, body).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(response_error(&response))
        }
    }

    /// GET an absolute URL returned by the service (`nextLink`, polling
    /// locations) and decode its JSON body.
    ///
    /// # Errors
    /// Returns [`ExecutorError::InvalidUrl`] if `link` is not absolute, plus
    /// the errors of [`ArmPipeline::send`].
    pub async fn get_link(&self, link: &str) -> Result<(HttpResponse, Option<Value>), ExecutorError> {
        let url = Url::parse(link).map_err(|e| ExecutorError::InvalidUrl {
            url: link.to_owned(),
            reason: e.to_string(),
        })?;
        let response = self.send(HttpMethod::Get, url, RequestBody::Empty).await?;
        let body = response.json()?;
        Ok((response, body))
    }
}

impl fmt::Debug for ArmPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArmPipeline")
            .field("endpoint", &self.endpoint)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Build the error for a failure response from its ARM error body.
///
/// Accepts `{"error": {"code", "message"}}` and the flat `{"code", "message"}`
/// form some providers return.
#[must_use]
pub fn response_error(response: &HttpResponse) -> ExecutorError {
    let body = response.json().ok().flatten();
    let detail = body.as_ref().map(|b| b.get("error").unwrap_or(b));

    let field = |name: &str| {
        detail
            .and_then(|d| d.get(name))
            .and_then(Value::as_str)
            .map(str::to_owned)
    };

    let code = field("code").unwrap_or_else(|| GENERIC_ERROR_CODE.to_owned());
    let message = field("message").unwrap_or_else(|| {
        format!("Operation returned an invalid status code {}", response.status)
    });

    ExecutorError::HttpResponse { status: response.status, code, message }
}
