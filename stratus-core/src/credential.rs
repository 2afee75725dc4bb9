use std::fmt;

use serde::Deserialize;

/// Service-principal credentials for one cloud account.
///
/// Supplied by the caller on every invocation and never validated here: a bad
/// tenant or secret only surfaces once a client asks for a token.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[non_exhaustive]
pub struct CredentialBundle {
    /// Directory (tenant) id the service principal belongs to.
    #[serde(alias = "tenantId")]
    pub tenant_id: String,
    /// Application (client) id of the service principal.
    #[serde(alias = "clientId")]
    pub client_id: String,
    /// Client secret of the service principal.
    #[serde(alias = "clientSecret")]
    pub client_secret: String,
    /// Subscription every subscription-scoped client is bound to.
    #[serde(alias = "subscriptionId")]
    pub subscription_id: String,
}

impl CredentialBundle {
    /// Creates a bundle from its four parts.
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        subscription_id: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            subscription_id: subscription_id.into(),
        }
    }
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("subscription_id", &self.subscription_id)
            .finish()
    }
}
