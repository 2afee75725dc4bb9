//! reqwest-backed [`Transport`] and the production [`Connector`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::backend::{Connector, Transport};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};
use crate::{EngineConfig, ExecutorError};

const USER_AGENT: &str = concat!("stratus/", env!("CARGO_PKG_VERSION"));

/// HTTPS transport over a dedicated `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Transport`] if the TLS backend cannot be
    /// initialised.
    pub fn new(timeout: Duration) -> Result<Self, ExecutorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ExecutorError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

fn to_reqwest(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ExecutorError> {
        let mut builder = self.client.request(to_reqwest(request.method), request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Form(pairs) => builder.form(&pairs),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ExecutorError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_owned()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| ExecutorError::Transport(e.to_string()))?
            .to_vec();

        Ok(HttpResponse { status, headers, body })
    }
}

/// Builds a new [`ReqwestTransport`] per request, as each client owns its
/// own connection pool.
#[derive(Debug, Clone, Default)]
pub struct AzureConnector {
    config: EngineConfig,
}

impl AzureConnector {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

impl Connector for AzureConnector {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn transport(&self) -> Result<Arc<dyn Transport>, ExecutorError> {
        Ok(Arc::new(ReqwestTransport::new(self.config.request_timeout)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_builds_independent_transports() {
        let connector = AzureConnector::new(EngineConfig::new());
        let first = match connector.transport() {
            Ok(t) => t,
            Err(e) => panic!("transport construction failed: {e}"),
        };
        let second = match connector.transport() {
            Ok(t) => t,
            Err(e) => panic!("transport construction failed: {e}"),
        };
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn method_mapping_covers_every_verb() {
        assert_eq!(to_reqwest(HttpMethod::Head), reqwest::Method::HEAD);
        assert_eq!(to_reqwest(HttpMethod::Patch), reqwest::Method::PATCH);
    }
}
