//! HTTP transport for MCP using Axum
//!
//! Serves MCP over server-sent events: one long-lived event stream per
//! session plus a POST side channel for inbound frames.

pub mod connection;
pub mod endpoints;
pub mod error;
pub mod handler;
pub mod jsonrpc;
pub mod session;
pub mod stream;

use axum::{
    routing::{get, post},
    Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::config::HttpConfig;
use crate::error::ProviderError;
use crate::mcp::CryptoServer;
use session::SessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Session store
    pub sessions: SessionStore,

    /// Tool and prompt registries
    pub server: CryptoServer,

    /// Cancelled once on server shutdown; every session loop holds a child
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(server: CryptoServer, max_sessions: usize) -> Self {
        Self {
            sessions: SessionStore::new(max_sessions),
            server,
            shutdown: CancellationToken::new(),
        }
    }
}

/// Builds the router with all endpoints and permissive CORS
///
/// # Endpoints
/// - GET /sse: event stream, first event names the side channel
/// - POST /messages/?session_id=<id>: inbound JSON-RPC frames (202)
/// - GET /health: liveness probe
pub fn router(state: AppState) -> Router {
    // Any origin, method and header
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/sse", get(endpoints::sse_connect))
        .route("/messages/", post(endpoints::post_message))
        .route("/messages", post(endpoints::post_message))
        .route("/health", get(endpoints::health))
        .layer(cors)
        .with_state(state)
}

/// Start the SSE server and serve until Ctrl+C
pub async fn start_sse_server(
    config: &HttpConfig,
    server: CryptoServer,
) -> Result<(), ProviderError> {
    tracing::info!("Initializing SSE MCP server...");

    let state = AppState::new(server, config.max_sessions);
    let shutdown = state.shutdown.clone();
    let app = router(state);

    let addr = config.addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("SSE MCP server listening on {}", addr);
    tracing::info!("  SSE endpoint: http://{}/sse", addr);
    tracing::info!("  POST endpoint: http://{}/messages/?session_id=<id>", addr);
    tracing::info!("  Health probe: http://{}/health", addr);
    tracing::info!("  Max concurrent sessions: {}", config.max_sessions);

    // Spawn shutdown signal handler
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received shutdown signal (Ctrl+C)");
                signal_token.cancel();
            }
            Err(err) => {
                tracing::error!("Failed to listen for shutdown signal: {}", err);
            }
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            tracing::info!("Shutting down SSE server...");
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
