//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the reflect handler on every path and method
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Record per-request metrics

use axum::{
    extract::State,
    http::{HeaderMap, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ReflectorConfig;
use crate::http::request::request_id;
use crate::observability::metrics;
use crate::reflector::{HttpUpstream, PageTemplate, Reflector};

/// Errors raised while building or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub reflector: Arc<Reflector<HttpUpstream>>,
}

/// HTTP server for the reflector.
pub struct ReflectorServer {
    router: Router,
    config: ReflectorConfig,
}

impl ReflectorServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ReflectorConfig) -> Result<Self, ServerError> {
        let upstream = HttpUpstream::new(&config.upstream)?;
        let reflector = Reflector::new(
            upstream,
            &config.upstream.origin,
            PageTemplate::new(&config.page),
        )
        .with_scan_memory_limit(config.upstream.scan_memory_limit_bytes);

        let state = AppState {
            reflector: Arc::new(reflector),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ReflectorConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(reflect_handler))
            .route("/", any(reflect_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for driving the server in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.origin,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ReflectorConfig {
        &self.config
    }
}

/// Reflects the requested path. Method, query and body are ignored.
async fn reflect_handler(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&headers);
    let path = uri.path();

    tracing::debug!(request_id = %request_id, path = %path, "Reflecting request");

    match state.reflector.reflect(path).await {
        Ok(reflection) => {
            let outcome = reflection.outcome();
            tracing::info!(
                request_id = %request_id,
                path = %path,
                outcome,
                "Request reflected"
            );
            metrics::record_reflection(outcome, start_time);
            reflection.into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, path = %path, error = %e, "Upstream error");
            metrics::record_reflection(metrics::UPSTREAM_FAILURE, start_time);
            e.into_response()
        }
    }
}
