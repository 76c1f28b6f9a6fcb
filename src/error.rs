//! Error types for Lumi
//!
//! Two levels:
//! - [`ProviderError`]: what went wrong in a single provider attempt. The
//!   router classifies these to decide between falling back and stopping.
//! - [`AppError`]: what the request as a whole failed with. Implements
//!   `IntoResponse` for Axum handlers and never leaks upstream detail to the
//!   client; detail goes to the logs.

use crate::providers::ProviderId;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Message shown to users when an upstream provider fails
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Lumi is having trouble connecting. Please try again.";

/// Message shown to users when the upstream rejects the configured model
pub const MODEL_NOT_FOUND_MESSAGE: &str =
    "Model ID error. Check that the configured model is available to your API key.";

/// Failure of a single provider attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// No credential is available (or the provider is not registered)
    #[error("{provider} is not configured: set {env_var}")]
    MissingCredential {
        provider: ProviderId,
        env_var: String,
    },

    /// Provider answered with a non-success HTTP status
    #[error("{provider} returned HTTP {status}: {message}")]
    Http {
        provider: ProviderId,
        status: u16,
        message: String,
    },

    /// Transport failure before any HTTP status was received
    #[error("could not reach {provider}: {message}")]
    Network { provider: ProviderId, message: String },

    #[error("{provider} did not answer within {timeout_seconds} seconds")]
    Timeout {
        provider: ProviderId,
        timeout_seconds: u64,
    },

    #[error("{provider} sent a response that could not be parsed: {details}")]
    UnparseableResponse { provider: ProviderId, details: String },

    #[error("{provider} returned an empty reply")]
    EmptyResponse { provider: ProviderId },

    /// History cannot be shaped into the provider's request format
    #[error("conversation cannot be sent to {provider}: {reason}")]
    InvalidHistory { provider: ProviderId, reason: String },

    /// A request built for one provider class was handed to another
    #[error("{provider} cannot send a {payload} request")]
    PayloadMismatch {
        provider: ProviderId,
        payload: &'static str,
    },
}

impl ProviderError {
    /// Provider the attempt was made against
    pub fn provider(&self) -> ProviderId {
        match self {
            Self::MissingCredential { provider, .. }
            | Self::Http { provider, .. }
            | Self::Network { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::UnparseableResponse { provider, .. }
            | Self::EmptyResponse { provider }
            | Self::InvalidHistory { provider, .. }
            | Self::PayloadMismatch { provider, .. } => *provider,
        }
    }

    /// HTTP status reported by the provider, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file {path}: {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration in {path}: {reason}")]
    ConfigValidationFailed { path: String, reason: String },

    #[error("Invalid request: {0}")]
    Validation(String),

    /// A provider failed in a way that falling back would not fix
    #[error("Upstream provider failed: {0}")]
    Upstream(#[source] ProviderError),

    /// Every candidate was skipped for quota or configuration reasons
    #[error("All {attempted} providers are unavailable; last error: {last_error}")]
    AllProvidersUnavailable { attempted: usize, last_error: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status code returned to the client
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Config(_)
            | Self::ConfigFileRead { .. }
            | Self::ConfigParseFailed { .. }
            | Self::ConfigValidationFailed { .. }
            | Self::Upstream(_)
            | Self::AllProvidersUnavailable { .. }
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Human-readable message returned to the client
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Upstream(err) if err.status() == Some(404) => MODEL_NOT_FOUND_MESSAGE.to_string(),
            Self::Upstream(_) => UPSTREAM_FAILURE_MESSAGE.to_string(),
            Self::AllProvidersUnavailable { last_error, .. } => format!(
                "Every assistant provider is busy or unavailable right now ({}). Please try again later.",
                last_error
            ),
            Self::Config(_)
            | Self::ConfigFileRead { .. }
            | Self::ConfigParseFailed { .. }
            | Self::ConfigValidationFailed { .. } => {
                "Lumi is not configured correctly. Please contact the administrator.".to_string()
            }
            Self::Internal(_) => "Something went wrong on our side. Please try again.".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({
            "error": self.user_message(),
        }));

        (status, body).into_response()
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;
