//! `scout serve` command: start the scout HTTP server.
//!
//! Reads TOML configuration, builds the chain client registry and collection
//! index, then starts an axum HTTP server with graceful shutdown support.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::http::Method;
use dotenvy::dotenv;
use tower_http::cors;

use crate::chain::ClientRegistry;
use crate::collections::CollectionIndex;
use crate::config::load_config;
use crate::error::Error;
use crate::routes::{self, AppState};
use crate::signal::shutdown_token;
use crate::telemetry;
use crate::xp::XpStore;

/// Execute the `serve` command.
///
/// # Errors
///
/// Returns an error if configuration loading, catalog validation, or server
/// binding fails.
pub async fn run(config_path: &Path) -> Result<(), Error> {
    // Load .env variables
    dotenv().ok();
    telemetry::init();

    let config = load_config(config_path)?;
    let registry = ClientRegistry::new(config.chains());
    let collections = CollectionIndex::build(config.collections(), &registry)?;
    tracing::info!(
        chains = registry.chains().count(),
        collections = collections.len(),
        "configuration loaded"
    );

    let state = Arc::new(AppState {
        registry,
        collections,
        xp: XpStore::default(),
    });

    let app = Router::new()
        .merge(routes::routes().with_state(state))
        .layer(telemetry::http_trace_layer())
        .layer(
            cors::CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(cors::Any),
        );

    let addr = SocketAddr::new(config.host(), config.port());
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .inspect_err(|e| tracing::error!("Failed to bind to {}: {}", addr, e))
        .map_err(|e| Error::Server(format!("failed to bind to {addr}: {e}")))?;

    let token = shutdown_token()
        .map_err(|e| Error::Server(format!("failed to register signal handlers: {e}")))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { token.cancelled().await })
        .await
        .map_err(|e| Error::Server(e.to_string()))?;

    Ok(())
}
