//! In-memory Azure stand-ins for tests.
//!
//! Enabled for this crate's unit tests and, through the `test-util` feature,
//! for downstream crates that drive a [`RequestGate`](crate::RequestGate)
//! without network access.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use stratus_core::{CredentialBundle, ServiceKind};

use crate::backend::{Connector, Transport};
use crate::client::ServiceClient;
use crate::credential::{ClientSecretCredential, TokenCredential};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::pipeline::ArmPipeline;
use crate::{EngineConfig, ExecutorError};

/// Subscription every test bundle and client is scoped to.
pub const TEST_SUBSCRIPTION: &str = "sub-1";

const TOKEN_PATH_SUFFIX: &str = "/oauth2/v2.0/token";

#[must_use]
pub fn json_response(status: u16, body: &Value) -> HttpResponse {
    HttpResponse::new(status).with_json(body)
}

#[must_use]
pub fn empty_response(status: u16) -> HttpResponse {
    HttpResponse::new(status)
}

/// Body of a successful token endpoint reply.
#[must_use]
pub fn token_body(token: &str, expires_in: u64) -> Value {
    json!({
        "token_type": "Bearer",
        "expires_in": expires_in,
        "access_token": token,
    })
}

#[must_use]
pub fn test_bundle() -> CredentialBundle {
    CredentialBundle::new("tenant-1", "client-1", "s3cret", TEST_SUBSCRIPTION)
}

fn test_config() -> EngineConfig {
    EngineConfig {
        lro_polling_interval: Duration::ZERO,
        ..EngineConfig::new()
    }
}

#[derive(Debug)]
struct Route {
    method: HttpMethod,
    path: String,
    responses: Vec<HttpResponse>,
    served: usize,
}

#[derive(Debug, Default)]
struct MockState {
    routes: Vec<Route>,
    requests: Vec<HttpRequest>,
}

/// Scripted transport keyed on method and URL path.
///
/// Token requests are answered automatically unless a route for the token
/// endpoint was registered. Anything else without a route receives an ARM
/// `404 NotFound` error.
#[derive(Debug)]
pub struct MockTransport {
    token: String,
    state: Mutex<MockState>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::with_token("test-token")
    }

    /// Transport whose default token endpoint issues `token`.
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self {
            token: token.to_owned(),
            state: Mutex::new(MockState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer every `method` request to `path` with `response`.
    pub fn route(&self, method: HttpMethod, path: &str, response: HttpResponse) {
        self.route_sequence(method, path, vec![response]);
    }

    /// Answer successive requests with `responses` in order; the last one
    /// repeats once the sequence is exhausted.
    pub fn route_sequence(&self, method: HttpMethod, path: &str, responses: Vec<HttpResponse>) {
        let mut state = self.state();
        state.routes.retain(|route| !(route.method == method && route.path == path));
        state.routes.push(Route {
            method,
            path: path.to_owned(),
            responses,
            served: 0,
        });
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state().requests.clone()
    }

    #[must_use]
    pub fn requests_to(&self, path: &str) -> usize {
        self.state().requests.iter().filter(|r| r.url.path() == path).count()
    }

    #[must_use]
    pub fn last_request_to(&self, path: &str) -> Option<HttpRequest> {
        self.state().requests.iter().rev().find(|r| r.url.path() == path).cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ExecutorError> {
        let mut state = self.state();
        let path = request.url.path().to_owned();
        let method = request.method;
        state.requests.push(request);

        if let Some(route) = state
            .routes
            .iter_mut()
            .find(|route| route.method == method && route.path == path)
        {
            let index = route.served.min(route.responses.len().saturating_sub(1));
            route.served += 1;
            return Ok(route.responses.get(index).cloned().unwrap_or_default());
        }

        if method == HttpMethod::Post && path.ends_with(TOKEN_PATH_SUFFIX) {
            return Ok(json_response(200, &token_body(&self.token, 3600)));
        }

        Ok(json_response(
            404,
            &json!({"error": {"code": "NotFound", "message": format!("No route for {method} {path}")}}),
        ))
    }
}

fn credential_for(transport: &Arc<MockTransport>, config: &EngineConfig) -> Arc<dyn TokenCredential> {
    Arc::new(ClientSecretCredential::new(
        &test_bundle(),
        &config.authority_host,
        Arc::clone(transport) as Arc<dyn Transport>,
    ))
}

/// Resource Manager pipeline authenticating through `transport`.
#[must_use]
pub fn pipeline_with(transport: &Arc<MockTransport>) -> ArmPipeline {
    let config = test_config();
    ArmPipeline::new(
        credential_for(transport, &config),
        Arc::clone(transport) as Arc<dyn Transport>,
        config.resource_manager.clone(),
        config.token_scope(),
    )
}

/// Client of `kind` talking to `transport`, scoped to [`TEST_SUBSCRIPTION`]
/// when the service is subscription-scoped.
#[must_use]
pub fn client_with(kind: ServiceKind, transport: &Arc<MockTransport>) -> Arc<ServiceClient> {
    let config = test_config();
    Arc::new(ServiceClient::new(
        kind,
        credential_for(transport, &config),
        kind.is_subscription_scoped().then(|| TEST_SUBSCRIPTION.to_owned()),
        Arc::clone(transport) as Arc<dyn Transport>,
        &config,
    ))
}

/// Connector handing out one shared [`MockTransport`].
///
/// Clones share the transport and the construction counter.
#[derive(Debug, Clone)]
pub struct MockConnector {
    config: EngineConfig,
    mock: Arc<MockTransport>,
    built: Arc<AtomicUsize>,
    fail_after: Option<usize>,
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: test_config(),
            mock: Arc::new(MockTransport::new()),
            built: Arc::new(AtomicUsize::new(0)),
            fail_after: None,
        }
    }

    /// Succeed `n` times, then refuse to build further transports.
    #[must_use]
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Number of transports successfully handed out.
    #[must_use]
    pub fn transports_built(&self) -> usize {
        self.built.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn mock(&self) -> &Arc<MockTransport> {
        &self.mock
    }
}

impl Connector for MockConnector {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn transport(&self) -> Result<Arc<dyn Transport>, ExecutorError> {
        let built = self.built.load(Ordering::SeqCst);
        if self.fail_after.is_some_and(|limit| built >= limit) {
            return Err(ExecutorError::Transport("no TLS backend available".to_owned()));
        }
        self.built.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&self.mock) as Arc<dyn Transport>)
    }
}

/// Credential bound to the connector's shared mock, built without counting
/// as a transport construction.
#[must_use]
pub fn test_credential(connector: &MockConnector) -> Arc<dyn TokenCredential> {
    credential_for(&connector.mock, &connector.config)
}

