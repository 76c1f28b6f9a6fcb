//! HTTP request handlers for the Lumi API

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::metrics::Metrics;
use crate::middleware::request_id_middleware;
use crate::providers::{Credentials, EnvCredentials, ProviderRegistry};
use crate::router::ChatRouter;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod chat;
pub mod extractor;
pub mod health;
pub mod metrics;
pub mod models;

/// Application state shared across all handlers
///
/// All fields are Arc'd for cheap cloning across Axum handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    router: Arc<ChatRouter>,
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create state reading API keys from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if metrics registration or HTTP client construction
    /// fails.
    pub fn new(config: Arc<Config>) -> AppResult<Self> {
        Self::with_credentials(config, Arc::new(EnvCredentials))
    }

    /// Create state with an explicit credential source
    pub fn with_credentials(
        config: Arc<Config>,
        credentials: Arc<dyn Credentials>,
    ) -> AppResult<Self> {
        let metrics = Arc::new(Metrics::new().map_err(|e| {
            AppError::Internal(format!("Failed to initialize metrics: {}", e))
        })?);

        let client = reqwest::Client::builder()
            .user_agent(concat!("lumi/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let registry = Arc::new(ProviderRegistry::from_config(&config, client));
        let router = Arc::new(ChatRouter::new(
            registry,
            credentials,
            config.assistant.system_prompt.clone(),
            metrics.clone(),
        ));

        Ok(Self {
            config,
            router,
            metrics,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn router(&self) -> &ChatRouter {
        &self.router
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

/// Build the HTTP application with all routes and layers
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat::handler))
        .route("/api/chat", post(chat::handler))
        .route("/health", get(health::handler))
        .route("/models", get(models::handler))
        .route("/metrics", get(metrics::handler))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(chat::MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        // Outermost, so rejected requests still carry a request ID
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "not found" })),
    )
}
