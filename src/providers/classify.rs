//! Failure classification for provider attempts
//!
//! Decides whether a failed attempt should fall back to the next provider.
//! HTTP status is checked first; message markers are only consulted when the
//! status is not conclusive.

use crate::error::ProviderError;

/// How the router reacts to a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Rate limited or out of quota: try the next provider
    Quota,
    /// No credential configured: try the next provider without a network call
    Config,
    /// Anything else: stop and surface the error
    Upstream,
}

impl FailureClass {
    /// Whether the router moves on to the next candidate
    pub fn falls_back(&self) -> bool {
        match self {
            FailureClass::Quota | FailureClass::Config => true,
            FailureClass::Upstream => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureClass::Quota => "quota",
            FailureClass::Config => "config",
            FailureClass::Upstream => "upstream",
        }
    }
}

/// Lower-case substrings that mark a rate-limit or quota message
const QUOTA_MARKERS: &[&str] = &[
    "quota",
    "rate limit",
    "rate_limit",
    "rate-limit",
    "ratelimit",
    "resource_exhausted",
    "resource has been exhausted",
    "too many requests",
];

const TOO_MANY_REQUESTS: u16 = 429;

/// Whether a provider error message signals quota exhaustion
pub fn has_quota_marker(message: &str) -> bool {
    let lower = message.to_lowercase();
    QUOTA_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Classify a failed provider attempt
pub fn classify_failure(error: &ProviderError) -> FailureClass {
    match error {
        ProviderError::MissingCredential { .. } => FailureClass::Config,
        ProviderError::Http { status, message, .. } => match *status {
            TOO_MANY_REQUESTS => FailureClass::Quota,
            // Bad credentials never improve by trying someone else's quota
            401 | 403 => FailureClass::Upstream,
            _ if has_quota_marker(message) => FailureClass::Quota,
            _ => FailureClass::Upstream,
        },
        ProviderError::Network { message, .. } if has_quota_marker(message) => FailureClass::Quota,
        ProviderError::Network { .. }
        | ProviderError::Timeout { .. }
        | ProviderError::UnparseableResponse { .. }
        | ProviderError::EmptyResponse { .. }
        | ProviderError::InvalidHistory { .. }
        | ProviderError::PayloadMismatch { .. } => FailureClass::Upstream,
    }
}
