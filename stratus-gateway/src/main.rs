//! Entry point for the `stratus-gateway` HTTP server.

use std::sync::Arc;

use stratus_executor::{AzureConnector, EngineConfig, ExecutionEngine, RequestGate};
use stratus_gateway::routes::create_router;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let addr = std::env::var("STRATUS_LISTEN_ADDR").unwrap_or_else(|_| "127.0.0.1:3457".to_owned());

    let config = EngineConfig::from_env();
    info!(
        authority = %config.authority_host,
        resource_manager = %config.resource_manager,
        "engine configured"
    );
    let gate = Arc::new(RequestGate::new(ExecutionEngine::new(AzureConnector::new(config))));
    let app = create_router(gate);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(addr = %addr, "stratus-gateway listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
