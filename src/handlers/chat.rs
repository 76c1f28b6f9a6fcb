//! Chat endpoint handler
//!
//! Handles `POST /chat` (and its `/api/chat` alias).

use crate::error::{AppError, AppResult};
use crate::handlers::AppState;
use crate::handlers::extractor::JsonBody;
use crate::history::ConversationHistory;
use crate::metrics::RequestOutcome;
use crate::middleware::RequestId;
use crate::providers::{ProviderId, ProviderResponse};
use crate::router::ChatTurn;
use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

/// Maximum allowed message length in characters (100K chars)
pub const MAX_MESSAGE_LENGTH: usize = 100_000;

/// Maximum number of history entries accepted in one request
pub const MAX_HISTORY_MESSAGES: usize = 500;

/// Maximum request body size in bytes (16 MiB)
///
/// Larger bodies are rejected with 413 before the length checks above run.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Chat request from client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// New user message; optional when `history` already ends in one
    #[serde(default)]
    pub message: Option<String>,
    /// Preferred provider id
    #[serde(default)]
    pub model: Option<String>,
    /// Older clients send the preferred provider as `agent`
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub history: ConversationHistory,
}

impl ChatRequest {
    /// Preferred provider, with `model` taking precedence over `agent`
    ///
    /// Unknown identifiers resolve to the default provider.
    pub fn preferred_provider(&self) -> ProviderId {
        let requested = [self.model.as_deref(), self.agent.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|id| !id.is_empty());

        match requested {
            Some(id) => id.parse().unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Unknown provider requested, using default");
                ProviderId::DEFAULT
            }),
            None => ProviderId::DEFAULT,
        }
    }

    /// Check size limits and convert to a [`ChatTurn`]
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an oversized message or history.
    pub fn into_turn(self) -> AppResult<ChatTurn> {
        if let Some(message) = &self.message {
            let char_count = message.chars().count();
            if char_count > MAX_MESSAGE_LENGTH {
                return Err(AppError::Validation(format!(
                    "message exceeds maximum length of {} characters (got {})",
                    MAX_MESSAGE_LENGTH, char_count
                )));
            }
        }

        if self.history.len() > MAX_HISTORY_MESSAGES {
            return Err(AppError::Validation(format!(
                "history exceeds maximum of {} messages (got {})",
                MAX_HISTORY_MESSAGES,
                self.history.len()
            )));
        }

        if let Some(index) = self
            .history
            .iter()
            .position(|m| m.content.chars().count() > MAX_MESSAGE_LENGTH)
        {
            return Err(AppError::Validation(format!(
                "history[{}] exceeds maximum length of {} characters",
                index, MAX_MESSAGE_LENGTH
            )));
        }

        let preferred = self.preferred_provider();
        Ok(ChatTurn {
            message: self.message,
            history: self.history,
            preferred: Some(preferred),
        })
    }
}

/// Chat response to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    /// Provider that answered
    pub model: ProviderId,
}

impl From<ProviderResponse> for ChatResponse {
    fn from(response: ProviderResponse) -> Self {
        Self {
            content: response.content,
            model: response.provider,
        }
    }
}

/// POST /chat handler
///
/// Providers are tried one at a time, each with its own timeout, so the
/// worst-case latency is the sum of the per-provider timeouts.
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    JsonBody(request): JsonBody<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    tracing::debug!(
        request_id = %request_id,
        has_message = request.message.is_some(),
        history_length = request.history.len(),
        model = ?request.model,
        agent = ?request.agent,
        "Received chat request"
    );

    let turn = match request.into_turn() {
        Ok(turn) => turn,
        Err(e) => {
            tracing::debug!(request_id = %request_id, error = %e, "Rejected chat request");
            if let Err(metrics_err) = state.metrics().record_request(RequestOutcome::Validation) {
                tracing::error!(
                    request_id = %request_id,
                    error = %metrics_err,
                    "Metrics recording failed (non-fatal)"
                );
                state.metrics().metrics_recording_failure("record_request");
            }
            return Err(e);
        }
    };

    let response = state.router().route(turn, request_id).await?;
    Ok(Json(response.into()))
}
