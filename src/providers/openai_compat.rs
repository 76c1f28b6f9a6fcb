//! Flat chat-completion adapter (Groq, Claude, OpenRouter)
//!
//! All three speak the OpenAI `/chat/completions` protocol with bearer
//! authentication. The persona goes in a leading `system` message and the
//! history is passed through in order, untouched.

use super::transport::send_json;
use super::{ChatProvider, ProviderId, ProviderRequest, RequestPayload};
use crate::config::ProviderEndpoint;
use crate::error::ProviderError;
use crate::history::{ConversationHistory, Role};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// `/chat/completions` request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// `system`, `user` or `assistant`
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Provider speaking the OpenAI chat-completions protocol
pub struct ChatCompletionProvider {
    client: reqwest::Client,
    endpoint: ProviderEndpoint,
}

impl ChatCompletionProvider {
    pub fn new(client: reqwest::Client, endpoint: ProviderEndpoint) -> Self {
        Self { client, endpoint }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.endpoint.base_url().trim_end_matches('/')
        )
    }
}

impl std::fmt::Debug for ChatCompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionProvider")
            .field("provider", &self.endpoint.id())
            .field("model", &self.endpoint.model())
            .field("base_url", &self.endpoint.base_url())
            .finish()
    }
}

#[async_trait]
impl ChatProvider for ChatCompletionProvider {
    fn id(&self) -> ProviderId {
        self.endpoint.id()
    }

    fn endpoint(&self) -> &ProviderEndpoint {
        &self.endpoint
    }

    fn build_request(
        &self,
        history: &ConversationHistory,
        system_prompt: &str,
    ) -> Result<ProviderRequest, ProviderError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage {
            role: "system",
            content: system_prompt.to_string(),
        });
        messages.extend(history.iter().map(|m| ChatMessage {
            role: match m.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: m.content.clone(),
        }));

        Ok(ProviderRequest {
            provider: self.id(),
            system_prompt: system_prompt.to_string(),
            payload: RequestPayload::ChatCompletion(ChatCompletionRequest {
                model: self.endpoint.model().to_string(),
                messages,
                temperature: self.endpoint.temperature(),
                max_tokens: self.endpoint.max_tokens(),
            }),
        })
    }

    async fn invoke(
        &self,
        request: &ProviderRequest,
        api_key: &str,
    ) -> Result<String, ProviderError> {
        let RequestPayload::ChatCompletion(body) = &request.payload else {
            return Err(ProviderError::PayloadMismatch {
                provider: self.id(),
                payload: request.payload.kind(),
            });
        };

        tracing::debug!(
            provider = %self.id(),
            model = %body.model,
            messages = body.messages.len(),
            "Calling chat completions"
        );

        let http_request = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(body);

        let response: ChatCompletionResponse = send_json(self.id(), http_request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse {
                provider: self.id(),
            })
    }
}
