//! Google Gemini adapter (turn-based)
//!
//! Gemini's `generateContent` endpoint rejects conversations that do not
//! start with a user turn, so history is shaped with
//! [`ConversationHistory::turn_based_view`] before sending.

use super::transport::send_json;
use super::{ChatProvider, ProviderId, ProviderRequest, RequestPayload};
use crate::config::ProviderEndpoint;
use crate::error::ProviderError;
use crate::history::{ConversationHistory, Role};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// `generateContent` request body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: SystemInstruction,
    /// Prior turns followed by the new user turn
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// Turns preceding the new input
    pub fn history(&self) -> &[Content] {
        match self.contents.split_last() {
            Some((_, history)) => history,
            None => &[],
        }
    }

    /// Text of the new user turn
    pub fn latest_input(&self) -> Option<&str> {
        self.contents.last().map(Content::text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInstruction {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    /// `user` or `model`
    pub role: &'static str,
    pub parts: Vec<Part>,
}

impl Content {
    fn new(role: &'static str, text: &str) -> Self {
        Self {
            role,
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }

    /// Text of the first part
    pub fn text(&self) -> &str {
        self.parts.first().map(|p| p.text.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, all parts joined
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        Some(text)
    }
}

fn gemini_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

/// Turn-based provider speaking the Gemini REST protocol
pub struct GeminiProvider {
    client: reqwest::Client,
    endpoint: ProviderEndpoint,
}

impl GeminiProvider {
    pub fn new(client: reqwest::Client, endpoint: ProviderEndpoint) -> Self {
        Self { client, endpoint }
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.base_url().trim_end_matches('/'),
            self.endpoint.model()
        )
    }
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("model", &self.endpoint.model())
            .field("base_url", &self.endpoint.base_url())
            .finish()
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    fn endpoint(&self) -> &ProviderEndpoint {
        &self.endpoint
    }

    fn build_request(
        &self,
        history: &ConversationHistory,
        system_prompt: &str,
    ) -> Result<ProviderRequest, ProviderError> {
        let view = history
            .turn_based_view()
            .ok_or_else(|| ProviderError::InvalidHistory {
                provider: self.id(),
                reason: "conversation has no message from the user".to_string(),
            })?;

        let mut contents: Vec<Content> = view
            .history
            .iter()
            .map(|m| Content::new(gemini_role(m.role), &m.content))
            .collect();
        // The new turn is always sent as the user's, whoever authored it
        contents.push(Content::new("user", view.input));

        let body = GenerateContentRequest {
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: system_prompt.to_string(),
                }],
            },
            contents,
            generation_config: GenerationConfig {
                temperature: self.endpoint.temperature(),
                max_output_tokens: self.endpoint.max_tokens(),
            },
        };

        Ok(ProviderRequest {
            provider: self.id(),
            system_prompt: system_prompt.to_string(),
            payload: RequestPayload::GenerateContent(body),
        })
    }

    async fn invoke(
        &self,
        request: &ProviderRequest,
        api_key: &str,
    ) -> Result<String, ProviderError> {
        let RequestPayload::GenerateContent(body) = &request.payload else {
            return Err(ProviderError::PayloadMismatch {
                provider: self.id(),
                payload: request.payload.kind(),
            });
        };

        tracing::debug!(
            provider = %self.id(),
            model = %self.endpoint.model(),
            turns = body.contents.len(),
            "Calling Gemini generateContent"
        );

        let http_request = self
            .client
            .post(self.generate_url())
            .header(API_KEY_HEADER, api_key)
            .json(body);

        let response: GenerateContentResponse = send_json(self.id(), http_request).await?;

        response
            .into_text()
            .filter(|text| !text.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse {
                provider: self.id(),
            })
    }
}
