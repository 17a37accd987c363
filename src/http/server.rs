//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router for the relay API
//! - Wire up middleware (tracing, request timeout, body limit)
//! - Serve with graceful shutdown on Ctrl+C

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::context::RelayContext;
use crate::http::handlers;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<RelayContext>,
}

pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(ctx: Arc<RelayContext>) -> Self {
        Self {
            router: build_router(ctx),
        }
    }

    /// Run until a shutdown signal arrives.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(ctx: Arc<RelayContext>) -> Router {
    let request_timeout = Duration::from_secs(ctx.config.server.request_timeout_secs);
    let max_body_bytes = ctx.config.server.max_body_bytes;

    Router::new()
        .route("/api/deposit", post(handlers::deposit))
        .route("/api/withdraw", post(handlers::withdraw))
        .route("/api/flow-vrf", post(handlers::flow_vrf))
        .route("/api/treasury-transaction", post(handlers::treasury_transaction))
        .route("/api/generate-entropy", post(handlers::generate_entropy))
        .route("/health", get(handlers::health))
        .with_state(AppState { ctx })
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// Wait for Ctrl+C.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
