//! Server assembly
//!
//! Builds the axum router, mounts the Socket.IO layer, and runs the
//! HTTP listener with graceful shutdown.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use socketioxide::layer::SocketIoLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api;
use crate::core::{Config, ServerState};
use crate::utils::{AppError, AppResult};

/// HTTP Server
pub struct Server {
    config: Config,
    state: ServerState,
    socket_layer: Option<SocketIoLayer>,
}

impl Server {
    pub fn new(config: Config, state: ServerState, socket_layer: Option<SocketIoLayer>) -> Self {
        Self {
            config,
            state,
            socket_layer,
        }
    }

    pub async fn run(self) -> AppResult<()> {
        self.state.start_background_tasks();

        let mut router = build_router(self.state.clone());
        router = router.layer(TimeoutLayer::new(Duration::from_millis(
            self.config.request_timeout_ms,
        )));
        if let Some(layer) = self.socket_layer {
            router = router.layer(layer);
        }

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
        info!("comanda-server listening on {addr}");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AppError::internal(format!("Server error: {e}")))
    }
}

/// API router without the transport layers. Integration tests drive
/// this directly through `tower::ServiceExt`.
pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .merge(api::health::router())
        .merge(api::orders::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutting down...");
}
