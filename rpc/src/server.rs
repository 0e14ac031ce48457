//! Axum-based HTTP server.

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use idv_notify::{DirectMessageNotifier, Notifier};
use idv_types::Provider;
use idv_verification::{AccountDirectory, SessionInitiator, WebhookEngine};

use crate::{handlers, Authenticator, RpcError, ServiceMetrics};

/// Everything a request handler can reach. Built once at startup and
/// shared read-only across requests.
pub struct AppState {
    pub engine: WebhookEngine,
    pub initiators: HashMap<Provider, SessionInitiator>,
    pub accounts: AccountDirectory,
    pub authenticator: Arc<dyn Authenticator>,
    /// Absent when no push credentials are configured.
    pub notifier: Option<Notifier>,
    /// Present exactly when `notifier` is.
    pub direct_messages: Option<DirectMessageNotifier>,
    pub metrics: Arc<ServiceMetrics>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/didit", post(handlers::didit))
        .route("/veriff", post(handlers::veriff))
        .route("/notify-wallet", post(handlers::notify_wallet))
        .route("/notify-dm", post(handlers::notify_dm))
        .route("/profile", post(handlers::provision_profile))
        .route(
            "/devices",
            post(handlers::register_device).delete(handlers::remove_device),
        )
        .route("/dm-threads", post(handlers::join_thread))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
}

pub struct RpcServer {
    pub port: u16,
    state: Arc<AppState>,
}

impl RpcServer {
    pub fn new(port: u16, state: Arc<AppState>) -> Self {
        Self { port, state }
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| RpcError::Server(format!("failed to bind {addr}: {e}")))?;
        tracing::info!(%addr, "HTTP server listening");

        axum::serve(listener, router(self.state.clone()))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}
