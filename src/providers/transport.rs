//! Shared HTTP exchange for provider adapters

use super::ProviderId;
use crate::error::ProviderError;
use serde::de::DeserializeOwned;

/// Longest upstream error text kept in errors and logs, in characters
const MAX_ERROR_CHARS: usize = 500;

/// Send a prepared request and decode a JSON success body
///
/// Non-success statuses become [`ProviderError::Http`] carrying the
/// provider's own error message when the body has one.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: ProviderId,
    request: reqwest::RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request.send().await.map_err(|e| ProviderError::Network {
        provider,
        message: e.to_string(),
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| ProviderError::Network {
        provider,
        message: format!("failed to read response body: {}", e),
    })?;

    if !status.is_success() {
        tracing::debug!(
            provider = %provider,
            status = status.as_u16(),
            body = %truncate_chars(&body, MAX_ERROR_CHARS),
            "Provider returned error status"
        );
        return Err(ProviderError::Http {
            provider,
            status: status.as_u16(),
            message: extract_error_message(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| ProviderError::UnparseableResponse {
        provider,
        details: e.to_string(),
    })
}

/// Pull a readable message out of a provider error body
///
/// Understands `{"error": {"message": ...}}` (Gemini and chat-completion
/// APIs), `{"error": "..."}` and `{"message": ...}`; anything else is
/// returned as truncated text.
pub(crate) fn extract_error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let from_json = parsed.as_ref().and_then(|v| {
        v.pointer("/error/message")
            .and_then(|m| m.as_str())
            .or_else(|| v.get("error").and_then(|e| e.as_str()))
            .or_else(|| v.get("message").and_then(|m| m.as_str()))
    });

    let message = from_json.unwrap_or(body).trim();
    if message.is_empty() {
        "no error details".to_string()
    } else {
        truncate_chars(message, MAX_ERROR_CHARS)
    }
}

/// Truncate on a character boundary
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
