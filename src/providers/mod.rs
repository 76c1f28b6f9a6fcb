//! LLM provider adapters
//!
//! Each provider class implements [`ChatProvider`]: it turns a
//! [`ConversationHistory`] into its own wire request and sends it. The
//! router looks providers up by [`ProviderId`] in a [`ProviderRegistry`] and
//! never branches on provider names itself.
//!
//! Two classes exist:
//! - turn-based ([`gemini::GeminiProvider`]): user/model roles, user-first
//!   history, final message sent as the new turn
//! - flat chat-completion ([`openai_compat::ChatCompletionProvider`]):
//!   leading system message, history passed through unchanged

pub mod classify;
pub mod credentials;
pub mod gemini;
pub mod openai_compat;
pub mod registry;

mod transport;

pub use classify::{FailureClass, classify_failure};
pub use credentials::{Credentials, EnvCredentials, StaticCredentials};
pub use registry::ProviderRegistry;

use crate::config::ProviderEndpoint;
use crate::error::ProviderError;
use crate::history::ConversationHistory;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Known providers
///
/// The declaration order is the fixed fallback order: the default provider
/// first, then alt-A, alt-B and alt-C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Google Gemini (default, turn-based)
    Gemini,
    /// Groq (alt-A)
    Groq,
    /// Anthropic Claude through its chat-completions compatible API (alt-B)
    Claude,
    /// OpenRouter (alt-C)
    OpenRouter,
}

/// Request shape a provider expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStyle {
    TurnBased,
    ChatCompletion,
}

impl ProviderId {
    pub const ALL: [ProviderId; 4] = [
        ProviderId::Gemini,
        ProviderId::Groq,
        ProviderId::Claude,
        ProviderId::OpenRouter,
    ];

    /// The designated default provider
    pub const DEFAULT: ProviderId = ProviderId::Gemini;
    pub const ALT_A: ProviderId = ProviderId::Groq;
    pub const ALT_B: ProviderId = ProviderId::Claude;
    pub const ALT_C: ProviderId = ProviderId::OpenRouter;

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Gemini => "gemini",
            ProviderId::Groq => "groq",
            ProviderId::Claude => "claude",
            ProviderId::OpenRouter => "openrouter",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::Gemini => "Google Gemini",
            ProviderId::Groq => "Groq",
            ProviderId::Claude => "Claude",
            ProviderId::OpenRouter => "OpenRouter",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ProviderId::Gemini => "Fast and powerful",
            ProviderId::Groq => "Lightning fast",
            ProviderId::Claude => "Creative & thoughtful",
            ProviderId::OpenRouter => "Open models, broad coverage",
        }
    }

    pub fn style(&self) -> ProviderStyle {
        match self {
            ProviderId::Gemini => ProviderStyle::TurnBased,
            ProviderId::Groq | ProviderId::Claude | ProviderId::OpenRouter => {
                ProviderStyle::ChatCompletion
            }
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderId::Gemini => "gemini-2.5-flash",
            ProviderId::Groq => "llama-3.3-70b-versatile",
            ProviderId::Claude => "claude-sonnet-4-5",
            ProviderId::OpenRouter => "meta-llama/llama-3.3-70b-instruct",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            ProviderId::Groq => "https://api.groq.com/openai/v1",
            ProviderId::Claude => "https://api.anthropic.com/v1",
            ProviderId::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            ProviderId::Gemini => "GOOGLE_API_KEY",
            ProviderId::Groq => "GROQ_API_KEY",
            ProviderId::Claude => "ANTHROPIC_API_KEY",
            ProviderId::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for identifiers outside the known provider set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider '{0}'")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderId {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ProviderId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

/// Provider-specific request body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestPayload {
    GenerateContent(gemini::GenerateContentRequest),
    ChatCompletion(openai_compat::ChatCompletionRequest),
}

impl RequestPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            RequestPayload::GenerateContent(_) => "generate-content",
            RequestPayload::ChatCompletion(_) => "chat-completion",
        }
    }
}

/// One attempt's request, built fresh for every provider tried
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderRequest {
    pub provider: ProviderId,
    pub system_prompt: String,
    pub payload: RequestPayload,
}

/// Successful reply, tagged with the provider that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderResponse {
    pub content: String,
    pub provider: ProviderId,
}

/// A remote chat-completion service
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Resolved endpoint settings (model, URL, credential variable, timeout)
    fn endpoint(&self) -> &ProviderEndpoint;

    /// Shape `history` into this provider's request
    ///
    /// Must be deterministic: the same history and prompt always produce an
    /// equal request.
    fn build_request(
        &self,
        history: &ConversationHistory,
        system_prompt: &str,
    ) -> Result<ProviderRequest, ProviderError>;

    /// Send the request and return the non-empty reply text
    async fn invoke(&self, request: &ProviderRequest, api_key: &str)
    -> Result<String, ProviderError>;
}
