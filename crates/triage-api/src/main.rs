//! # triage-api: Binary Entry Point
//!
//! Starts the validation service. Binds to `PORT` (default 3000).

use std::sync::Arc;

use triage_api::state::{AppConfig, AppState};
use triage_core::{TemporaryIdRegistry, UnconfiguredRegistry};
use triage_registry_client::{RegistryClient, RegistryConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration error: {e}");
        e
    })?;

    let registry: Arc<dyn TemporaryIdRegistry> = match RegistryConfig::from_env() {
        Ok(registry_config) => {
            let registry_config = registry_config.with_lookup_budget(config.registry_timeout);
            tracing::info!(
                base_url = %registry_config.base_url,
                max_retries = registry_config.retry.max_retries,
                "Patient registry configured"
            );
            let client = RegistryClient::new(registry_config).map_err(|e| {
                tracing::error!("Failed to create registry client: {e}");
                e
            })?;
            Arc::new(client)
        }
        Err(e) => {
            tracing::warn!(
                "Patient registry not configured: {e}. Records carrying a temporary id will return 503."
            );
            Arc::new(UnconfiguredRegistry)
        }
    };

    let port = config.port;
    tracing::info!(
        unknown_fields = ?config.unknown_fields,
        registry_timeout_ms = config.registry_timeout.as_millis() as u64,
        "Validator configured"
    );
    let state = AppState::with_registry(config, registry).map_err(|e| {
        tracing::error!("Schema compilation failed: {e}");
        e
    })?;

    let app = triage_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Triage API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Structured logging; `LOG_FORMAT=json` switches to one JSON object per line.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
