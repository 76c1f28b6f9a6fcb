//! Sequential provider trial with quota fallback

use super::{ChatTurn, priority_list};
use crate::error::{AppError, AppResult, ProviderError};
use crate::history::{ConversationHistory, ConversationMessage};
use crate::metrics::{AttemptOutcome, Metrics, RequestOutcome};
use crate::middleware::RequestId;
use crate::providers::{
    ChatProvider, Credentials, FailureClass, ProviderId, ProviderRegistry, ProviderResponse,
    classify_failure,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Routes chat turns across providers
///
/// Providers are tried strictly one at a time in [`priority_list`] order.
/// The first non-empty reply wins. Quota and configuration failures move on
/// to the next provider; every other failure ends the call with that
/// provider's error.
#[derive(Clone)]
pub struct ChatRouter {
    registry: Arc<ProviderRegistry>,
    credentials: Arc<dyn Credentials>,
    system_prompt: String,
    metrics: Arc<Metrics>,
}

impl ChatRouter {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        credentials: Arc<dyn Credentials>,
        system_prompt: impl Into<String>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            registry,
            credentials,
            system_prompt: system_prompt.into(),
            metrics,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Whether `id` is registered and its API key is currently set
    pub fn is_configured(&self, id: ProviderId) -> bool {
        self.registry
            .get(id)
            .is_some_and(|p| self.credentials.lookup(p.endpoint().api_key_env()).is_some())
    }

    /// Answer one chat turn
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] when the merged history has no message with
    ///   content (no provider is contacted)
    /// - [`AppError::Upstream`] for the first failure that is neither quota
    ///   nor configuration
    /// - [`AppError::AllProvidersUnavailable`] when every candidate was
    ///   skipped; carries the last recorded error
    pub async fn route(&self, turn: ChatTurn, request_id: RequestId) -> AppResult<ProviderResponse> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let history = turn
            .history
            .with_user_message(turn.message.as_deref(), timestamp);

        if !history.iter().any(ConversationMessage::has_content) {
            tracing::debug!(request_id = %request_id, "Rejecting chat turn without messages");
            self.observe(
                request_id,
                "record_request",
                self.metrics.record_request(RequestOutcome::Validation),
            );
            return Err(AppError::Validation("no messages provided".to_string()));
        }

        let preferred = turn.preferred.unwrap_or(ProviderId::DEFAULT);
        let order = priority_list(preferred);
        let total = order.len();
        let mut last_error: Option<ProviderError> = None;

        tracing::debug!(
            request_id = %request_id,
            preferred = %preferred,
            order = ?order,
            messages = history.len(),
            "Routing chat turn"
        );

        for (index, provider) in order.iter().copied().enumerate() {
            let attempt = index + 1;

            match self.attempt(provider, &history, request_id, attempt).await {
                Ok(content) => {
                    tracing::info!(
                        request_id = %request_id,
                        provider = %provider,
                        attempt = attempt,
                        response_length = content.len(),
                        "Chat turn answered"
                    );
                    self.observe(
                        request_id,
                        "record_attempt",
                        self.metrics.record_attempt(provider, AttemptOutcome::Success),
                    );
                    self.observe(
                        request_id,
                        "record_request",
                        self.metrics.record_request(RequestOutcome::Success),
                    );
                    return Ok(ProviderResponse { content, provider });
                }
                Err(error) => {
                    let class = classify_failure(&error);
                    self.observe(
                        request_id,
                        "record_attempt",
                        self.metrics
                            .record_attempt(provider, AttemptOutcome::Failed(class)),
                    );

                    if !class.falls_back() {
                        tracing::error!(
                            request_id = %request_id,
                            provider = %provider,
                            attempt = attempt,
                            error = %error,
                            "Provider failed, not falling back"
                        );
                        self.observe(
                            request_id,
                            "record_request",
                            self.metrics.record_request(RequestOutcome::Upstream),
                        );
                        return Err(AppError::Upstream(error));
                    }

                    match class {
                        FailureClass::Config => tracing::warn!(
                            request_id = %request_id,
                            provider = %provider,
                            attempt = attempt,
                            error = %error,
                            "Provider not configured, skipping"
                        ),
                        _ => tracing::warn!(
                            request_id = %request_id,
                            provider = %provider,
                            attempt = attempt,
                            remaining = total - attempt,
                            error = %error,
                            "Provider out of quota, trying next"
                        ),
                    }
                    self.observe(
                        request_id,
                        "record_fallback",
                        self.metrics.record_fallback(provider),
                    );
                    last_error = Some(error);
                }
            }
        }

        let last_error = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no providers to try".to_string());

        tracing::error!(
            request_id = %request_id,
            attempted = total,
            last_error = %last_error,
            "All providers unavailable"
        );
        self.observe(
            request_id,
            "record_request",
            self.metrics.record_request(RequestOutcome::Exhausted),
        );

        Err(AppError::AllProvidersUnavailable {
            attempted: total,
            last_error,
        })
    }

    /// One provider attempt: credential check, request build, timed call
    async fn attempt(
        &self,
        id: ProviderId,
        history: &ConversationHistory,
        request_id: RequestId,
        attempt: usize,
    ) -> Result<String, ProviderError> {
        let Some(provider) = self.registry.get(id) else {
            return Err(ProviderError::MissingCredential {
                provider: id,
                env_var: id.default_api_key_env().to_string(),
            });
        };
        let endpoint = provider.endpoint();

        let api_key = self.credentials.lookup(endpoint.api_key_env()).ok_or_else(|| {
            ProviderError::MissingCredential {
                provider: id,
                env_var: endpoint.api_key_env().to_string(),
            }
        })?;

        let request = provider.build_request(history, &self.system_prompt)?;
        let timeout_seconds = endpoint.timeout_seconds();

        tracing::debug!(
            request_id = %request_id,
            provider = %id,
            model = %endpoint.model(),
            attempt = attempt,
            payload = request.payload.kind(),
            timeout_seconds = timeout_seconds,
            "Attempting provider"
        );

        let start = Instant::now();
        let result = tokio::time::timeout(
            Duration::from_secs(timeout_seconds),
            provider.invoke(&request, &api_key),
        )
        .await;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        self.observe(
            request_id,
            "record_latency",
            self.metrics.record_latency(id, elapsed_ms),
        );

        match result {
            Ok(reply) => reply,
            Err(_) => Err(ProviderError::Timeout {
                provider: id,
                timeout_seconds,
            }),
        }
    }

    /// Log-and-continue on metrics failures
    fn observe(
        &self,
        request_id: RequestId,
        operation: &'static str,
        result: Result<(), prometheus::Error>,
    ) {
        if let Err(e) = result {
            tracing::error!(
                request_id = %request_id,
                operation = operation,
                error = %e,
                "Metrics recording failed (non-fatal)"
            );
            self.metrics.metrics_recording_failure(operation);
        }
    }
}

impl std::fmt::Debug for ChatRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRouter")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
