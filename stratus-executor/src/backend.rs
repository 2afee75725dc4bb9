//! Transport abstraction.
//!
//! Separates the credential, pipeline and client logic from the HTTP stack so
//! the registry can be exercised against an in-memory service in tests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::http::{HttpRequest, HttpResponse};
use crate::{EngineConfig, ExecutorError};

/// One HTTP round trip.
///
/// Implementations must be `Send + Sync`; a transport is shared by every
/// request a single client makes.
///
/// # Cancel Safety
/// Dropping the future abandons the request; no state is kept between calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the response, whatever its status.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Transport`] if no response was received.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ExecutorError>;
}

/// Factory for the transports the credential and every service client own.
pub trait Connector: Send + Sync {
    /// Endpoints and timings transports are built with.
    fn config(&self) -> &EngineConfig;

    /// Construct a fresh transport.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Transport`] if the HTTP stack cannot be
    /// initialised (for example, no TLS backend).
    fn transport(&self) -> Result<Arc<dyn Transport>, ExecutorError>;
}
