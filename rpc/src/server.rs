//! Axum-based HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::info;

use crate::error::RpcError;
use crate::handlers::{self, AppState, SharedState};

pub struct RpcServer {
    pub bind_address: String,
    pub port: u16,
    pub state: SharedState,
}

impl RpcServer {
    pub fn new(bind_address: impl Into<String>, port: u16, state: AppState) -> Self {
        Self {
            bind_address: bind_address.into(),
            port,
            state: Arc::new(state),
        }
    }

    /// All routes, bound to this server's state.
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Bind and serve until `shutdown` fires.
    pub async fn start(&self, shutdown: broadcast::Receiver<()>) -> Result<(), RpcError> {
        let addr = format!("{}:{}", self.bind_address, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| RpcError::Internal(format!("failed to bind {addr}: {e}")))?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already-bound listener.
    pub async fn serve(
        &self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), RpcError> {
        let local: Option<SocketAddr> = listener.local_addr().ok();
        info!(addr = ?local, "HTTP server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await
            .map_err(|e| RpcError::Internal(format!("server error: {e}")))?;

        info!("HTTP server stopped");
        Ok(())
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/verify-lawyer", post(handlers::verify_lawyer))
        .route(
            "/api/admin/verification-requests",
            get(handlers::list_verification_requests),
        )
        .route(
            "/api/admin/approve-verification/:id",
            post(handlers::approve_verification),
        )
        .route(
            "/api/admin/reject-verification/:id",
            post(handlers::reject_verification),
        )
        .route("/api/admin/add-lawyer", post(handlers::add_lawyer))
        .route("/api/admin/lawyers", get(handlers::list_lawyers))
        .route("/health", get(handlers::health))
        .with_state(state)
}
