//! Provider lookup table

use super::gemini::GeminiProvider;
use super::openai_compat::ChatCompletionProvider;
use super::{ChatProvider, ProviderId, ProviderStyle};
use crate::config::Config;
use std::collections::HashMap;
use std::sync::Arc;

/// Providers keyed by identifier
///
/// A provider missing from the registry is treated by the router exactly
/// like one without a credential.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderId, Arc<dyn ChatProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one adapter per known provider from configuration
    ///
    /// All adapters share `client` and its connection pool.
    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        let mut registry = Self::new();
        for id in ProviderId::ALL {
            let endpoint = config.provider_endpoint(id);
            let provider: Arc<dyn ChatProvider> = match id.style() {
                ProviderStyle::TurnBased => Arc::new(GeminiProvider::new(client.clone(), endpoint)),
                ProviderStyle::ChatCompletion => {
                    Arc::new(ChatCompletionProvider::new(client.clone(), endpoint))
                }
            };
            registry.register(provider);
        }
        registry
    }

    /// Add or replace the adapter for `provider.id()`
    pub fn register(&mut self, provider: Arc<dyn ChatProvider>) {
        self.providers.insert(provider.id(), provider);
    }

    pub fn with(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, id: ProviderId) -> Option<&Arc<dyn ChatProvider>> {
        self.providers.get(&id)
    }

    pub fn contains(&self, id: ProviderId) -> bool {
        self.providers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&ProviderId> = self.providers.keys().collect();
        ids.sort();
        f.debug_struct("ProviderRegistry")
            .field("providers", &ids)
            .finish()
    }
}
