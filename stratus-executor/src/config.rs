//! Engine configuration: cloud endpoints and timing.

use std::time::Duration;

/// Default Microsoft Entra ID authority.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Default Azure Resource Manager endpoint.
pub const DEFAULT_RESOURCE_MANAGER: &str = "https://management.azure.com";

/// Configuration shared by every execution an engine performs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct EngineConfig {
    /// Authority that issues tokens for client-secret credentials.
    pub authority_host: String,

    /// Resource Manager endpoint every client talks to.
    pub resource_manager: String,

    /// Per-request HTTP timeout.
    pub request_timeout: Duration,

    /// Delay between long-running-operation polls when the service sends no
    /// `Retry-After` header.
    pub lro_polling_interval: Duration,
}

impl EngineConfig {
    /// Create a config pointing at the public cloud with default timings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            authority_host: DEFAULT_AUTHORITY_HOST.to_owned(),
            resource_manager: DEFAULT_RESOURCE_MANAGER.to_owned(),
            request_timeout: Duration::from_secs(60),
            lro_polling_interval: Duration::from_secs(30),
        }
    }

    /// Build a config from the process environment.
    ///
    /// Reads `STRATUS_AUTHORITY_HOST` (falling back to `AZURE_AUTHORITY_HOST`),
    /// `STRATUS_RESOURCE_MANAGER`, `STRATUS_REQUEST_TIMEOUT_SECS` and
    /// `STRATUS_LRO_POLL_SECS`. Unset or unparseable values keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new();

        if let Some(host) = lookup("STRATUS_AUTHORITY_HOST").or_else(|| lookup("AZURE_AUTHORITY_HOST")) {
            config.authority_host = host;
        }
        if let Some(endpoint) = lookup("STRATUS_RESOURCE_MANAGER") {
            config.resource_manager = endpoint;
        }
        if let Some(secs) = seconds(&lookup, "STRATUS_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = secs;
        }
        if let Some(secs) = seconds(&lookup, "STRATUS_LRO_POLL_SECS") {
            config.lro_polling_interval = secs;
        }

        config
    }

    /// OAuth2 scope requesting Resource Manager access.
    #[must_use]
    pub fn token_scope(&self) -> String {
        format!("{}/.default", self.resource_manager.trim_end_matches('/'))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn seconds(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "ignoring unparseable duration");
            None
        }
    }
}
