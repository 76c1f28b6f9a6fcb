//! Health check endpoint

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::handlers::AppState;
use crate::providers::ProviderId;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub providers: Vec<ProviderHealth>,
    /// "operational", or "degraded" once a metrics recording has failed
    pub metrics_status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ProviderHealth {
    pub id: ProviderId,
    /// Registered with an API key currently set
    pub configured: bool,
}

/// Health check handler
///
/// Always 200 while the process serves requests. Providers without a key are
/// reported, not treated as unhealthy: the router skips them.
pub async fn handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let providers = ProviderId::ALL
        .into_iter()
        .map(|id| ProviderHealth {
            id,
            configured: state.router().is_configured(id),
        })
        .collect();

    let metrics_status = if state.metrics().metrics_recording_failures_count() > 0 {
        "degraded"
    } else {
        "operational"
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "OK",
            providers,
            metrics_status,
        }),
    )
}
