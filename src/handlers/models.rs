//! Models endpoint handler
//!
//! Exposes the provider catalog via GET /models, in fallback order.

use crate::handlers::AppState;
use crate::providers::ProviderId;
use axum::{Json, extract::State};
use serde::Serialize;

/// Response for GET /models endpoint
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

/// One selectable provider
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub id: ProviderId,
    pub name: &'static str,
    pub description: &'static str,
    /// Upstream model the provider is called with
    pub model: String,
    pub configured: bool,
    pub default: bool,
}

/// GET /models handler
pub async fn handler(State(state): State<AppState>) -> Json<ModelsResponse> {
    let router = state.router();
    let models: Vec<ModelInfo> = ProviderId::ALL
        .into_iter()
        .map(|id| ModelInfo {
            id,
            name: id.display_name(),
            description: id.description(),
            model: state.config().provider_endpoint(id).model().to_string(),
            configured: router.is_configured(id),
            default: id == ProviderId::DEFAULT,
        })
        .collect();

    tracing::debug!(
        total_models = models.len(),
        configured_count = models.iter().filter(|m| m.configured).count(),
        "Retrieved provider catalog for /models endpoint"
    );

    Json(ModelsResponse { models })
}
