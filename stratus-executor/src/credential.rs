//! OAuth2 client-credentials token acquisition.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use stratus_core::CredentialBundle;
use tokio::sync::Mutex;

use crate::backend::Transport;
use crate::http::{join_segments, HttpMethod, HttpRequest, RequestBody};
use crate::ExecutorError;

/// Tokens this close to expiry are refreshed before use.
const REFRESH_MARGIN_SECS: i64 = 300;

/// A bearer token and the instant it stops being valid.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        TimeDelta::try_seconds(REFRESH_MARGIN_SECS)
            .and_then(|margin| self.expires_on.checked_sub_signed(margin))
            .is_some_and(|deadline| deadline > now)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Source of bearer tokens for a scope.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Return a token valid for `scope`, fetching one if needed.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Authentication`] if the authority rejects the
    /// request or cannot be reached.
    async fn get_token(&self, scope: &str) -> Result<AccessToken, ExecutorError>;
}

/// Service-principal credential: tenant, client id and client secret.
///
/// Construction performs no I/O; the first [`TokenCredential::get_token`]
/// call contacts the authority. Tokens are cached per scope for the lifetime
/// of the credential.
pub struct ClientSecretCredential {
    authority_host: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
    transport: Arc<dyn Transport>,
    cache: Mutex<HashMap<String, AccessToken>>,
}

impl ClientSecretCredential {
    #[must_use]
    pub fn new(bundle: &CredentialBundle, authority_host: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            authority_host: authority_host.to_owned(),
            tenant_id: bundle.tenant_id.clone(),
            client_id: bundle.client_id.clone(),
            client_secret: bundle.client_secret.clone(),
            transport,
            cache: Mutex::new(HashMap::new()),
        }
    }

    async fn request_token(&self, scope: &str) -> Result<AccessToken, ExecutorError> {
        let auth_err = |reason: String| ExecutorError::Authentication { reason };

        let url = join_segments(&self.authority_host, &[self.tenant_id.as_str(), "oauth2", "v2.0", "token"])
            .map_err(|e| auth_err(e.to_string()))?;
        let request = HttpRequest::new(HttpMethod::Post, url)
            .header("Accept", "application/json")
            .body(RequestBody::Form(vec![
                ("grant_type".to_owned(), "client_credentials".to_owned()),
                ("client_id".to_owned(), self.client_id.clone()),
                ("client_secret".to_owned(), self.client_secret.clone()),
                ("scope".to_owned(), scope.to_owned()),
            ]));

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| auth_err(e.to_string()))?;
        let body = response.json().map_err(|e| auth_err(e.to_string()))?;

        if !response.is_success() {
            let reason = body
                .as_ref()
                .and_then(|b| serde_json::from_value::<AuthorityError>(b.clone()).ok())
                .map_or_else(
                    || format!("authority returned HTTP {}", response.status),
                    AuthorityError::describe,
                );
            return Err(auth_err(reason));
        }

        let Some(body) = body else {
            return Err(auth_err("authority returned an empty body".to_owned()));
        };
        let grant: TokenGrant =
            serde_json::from_value(body).map_err(|e| auth_err(format!("malformed token response: {e}")))?;
        let expires_on = grant
            .expires_in
            .as_seconds()
            .and_then(TimeDelta::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| auth_err("malformed token response: expires_in".to_owned()))?;

        Ok(AccessToken {
            token: grant.access_token,
            expires_on,
        })
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken, ExecutorError> {
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.get(scope) {
            if token.is_fresh(Utc::now()) {
                return Ok(token.clone());
            }
        }

        tracing::debug!(tenant = %self.tenant_id, client_id = %self.client_id, scope, "requesting token");
        let token = self.request_token(scope).await?;
        cache.insert(scope.to_owned(), token.clone());
        Ok(token)
    }
}

impl fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("authority_host", &self.authority_host)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct TokenGrant {
    access_token: String,
    expires_in: Lifetime,
}

/// `expires_in` arrives as a number from most authorities and as a string
/// from some.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lifetime {
    Seconds(i64),
    Text(String),
}

impl Lifetime {
    fn as_seconds(&self) -> Option<i64> {
        match self {
            Self::Seconds(secs) => Some(*secs),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Deserialize)]
struct AuthorityError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl AuthorityError {
    fn describe(self) -> String {
        match self.error_description {
            Some(description) => format!("{}: {}", self.error, first_line(&description)),
            None => self.error,
        }
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or(text).trim()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::{json_response, token_body, MockTransport};

    const SCOPE: &str = "https://management.azure.com/.default";

    fn credential(transport: &Arc<MockTransport>) -> ClientSecretCredential {
        let bundle = CredentialBundle::new("tenant-1", "client-1", "s3cret", "sub-1");
        ClientSecretCredential::new(&bundle, "https://login.example.com", transport.clone())
    }

    #[tokio::test]
    async fn fetches_token_with_client_credentials_grant() {
        let transport = Arc::new(MockTransport::new());
        transport.route(
            HttpMethod::Post,
            "/tenant-1/oauth2/v2.0/token",
            json_response(200, &token_body("tok-1", 3600)),
        );

        let token = match credential(&transport).get_token(SCOPE).await {
            Ok(t) => t,
            Err(e) => panic!("token request failed: {e}"),
        };
        assert_eq!(token.token, "tok-1");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let RequestBody::Form(pairs) = &requests[0].body else {
            panic!("token request must be form-encoded");
        };
        assert!(pairs.contains(&("grant_type".to_owned(), "client_credentials".to_owned())));
        assert!(pairs.contains(&("scope".to_owned(), SCOPE.to_owned())));
    }

    #[tokio::test]
    async fn caches_fresh_tokens() {
        let transport = Arc::new(MockTransport::new());
        transport.route(
            HttpMethod::Post,
            "/tenant-1/oauth2/v2.0/token",
            json_response(200, &token_body("tok-1", 3600)),
        );
        let credential = credential(&transport);
        for _ in 0..3 {
            assert!(credential.get_token(SCOPE).await.is_ok());
        }
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn refreshes_tokens_inside_the_margin() {
        let transport = Arc::new(MockTransport::new());
        transport.route(
            HttpMethod::Post,
            "/tenant-1/oauth2/v2.0/token",
            json_response(200, &json!({"access_token": "short", "expires_in": "60"})),
        );
        let credential = credential(&transport);
        assert!(credential.get_token(SCOPE).await.is_ok());
        assert!(credential.get_token(SCOPE).await.is_ok());
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn out_of_range_lifetime_is_an_authentication_failure() {
        for expires_in in [json!(i64::MAX), json!(i64::MIN), json!("9223372036854775807")] {
            let transport = Arc::new(MockTransport::new());
            transport.route(
                HttpMethod::Post,
                "/tenant-1/oauth2/v2.0/token",
                json_response(200, &json!({"access_token": "t", "expires_in": expires_in})),
            );
            let err = match credential(&transport).get_token(SCOPE).await {
                Err(e) => e,
                Ok(t) => panic!("expected failure for {expires_in}, got {t:?}"),
            };
            assert_eq!(
                err.to_string(),
                "ClientSecretCredential.get_token failed: malformed token response: expires_in"
            );
        }
    }

    #[tokio::test]
    async fn authority_errors_become_authentication_failures() {
        let transport = Arc::new(MockTransport::new());
        transport.route(
            HttpMethod::Post,
            "/tenant-1/oauth2/v2.0/token",
            json_response(
                401,
                &json!({
                    "error": "invalid_client",
                    "error_description": "AADSTS7000215: Invalid client secret provided.\r\nTrace ID: 1",
                }),
            ),
        );

        let err = match credential(&transport).get_token(SCOPE).await {
            Err(e) => e,
            Ok(t) => panic!("expected failure, got {t:?}"),
        };
        assert_eq!(
            err.to_string(),
            "ClientSecretCredential.get_token failed: invalid_client: AADSTS7000215: Invalid client secret provided."
        );
    }

    #[test]
    fn debug_redacts_secret() {
        let transport = Arc::new(MockTransport::new());
        let rendered = format!("{:?}", credential(&transport));
        assert!(!rendered.contains("s3cret"), "secret leaked: {rendered}");
    }
}
