//! Configuration management for Lumi
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Provider credentials are NOT part of the file: each provider names the
//! environment variable holding its API key, and the variable is read at
//! call time.

use crate::providers::ProviderId;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::str::FromStr;

/// Persona instruction sent to every provider
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Lumi, a brilliant and friendly school assistant. \
Your goal is to help students with homework, explain complex topics simply, and help with study plans. \
Use Markdown for formatting. Always be encouraging and academic but accessible.";

/// Upper bound for any timeout, in seconds
pub const MAX_TIMEOUT_SECONDS: u64 = 300;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Default per-attempt timeout, overridable per provider
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl ServerConfig {
    /// Address to bind, from `host` (an IP literal) and `port`
    pub fn socket_addr(&self) -> crate::error::AppResult<SocketAddr> {
        let ip = self.host.parse::<IpAddr>().map_err(|_| {
            crate::error::AppError::Config(format!(
                "server.host '{}' must be an IP address such as 127.0.0.1 or 0.0.0.0",
                self.host
            ))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Assistant persona
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssistantConfig {
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

/// Per-provider overrides
///
/// Every section is optional. A provider without a section still exists and
/// uses its built-in defaults; it becomes usable as soon as its API key
/// environment variable is set.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub gemini: ProviderSettings,
    #[serde(default)]
    pub groq: ProviderSettings,
    #[serde(default)]
    pub claude: ProviderSettings,
    #[serde(default)]
    pub openrouter: ProviderSettings,
}

impl ProvidersConfig {
    pub fn settings(&self, id: ProviderId) -> &ProviderSettings {
        match id {
            ProviderId::Gemini => &self.gemini,
            ProviderId::Groq => &self.groq,
            ProviderId::Claude => &self.claude,
            ProviderId::OpenRouter => &self.openrouter,
        }
    }
}

/// Raw provider section as written in config.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSettings {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key_env: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

/// Fully resolved provider endpoint
///
/// Fields are private; instances come from [`Config::provider_endpoint`] or
/// [`ProviderEndpoint::defaults`] so every value has passed through the
/// provider's defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderEndpoint {
    id: ProviderId,
    model: String,
    base_url: String,
    api_key_env: String,
    temperature: f64,
    max_tokens: u32,
    timeout_seconds: u64,
}

impl ProviderEndpoint {
    /// Endpoint with the provider's built-in defaults
    pub fn defaults(id: ProviderId) -> Self {
        Self {
            id,
            model: id.default_model().to_string(),
            base_url: id.default_base_url().to_string(),
            api_key_env: id.default_api_key_env().to_string(),
            temperature: 0.7,
            max_tokens: 2048,
            timeout_seconds: default_request_timeout(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key_env(mut self, api_key_env: impl Into<String>) -> Self {
        self.api_key_env = api_key_env.into();
        self
    }

    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn id(&self) -> ProviderId {
        self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Name of the environment variable holding the API key
    pub fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::error::AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            crate::error::AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|source| {
            crate::error::AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            }
        })?;

        config
            .validate()
            .map_err(|e| crate::error::AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Resolve a provider's endpoint from its section and built-in defaults
    ///
    /// The timeout falls back to `server.request_timeout_seconds` when the
    /// provider does not override it.
    pub fn provider_endpoint(&self, id: ProviderId) -> ProviderEndpoint {
        let settings = self.providers.settings(id);
        let defaults = ProviderEndpoint::defaults(id);

        ProviderEndpoint {
            id,
            model: settings.model.clone().unwrap_or(defaults.model),
            base_url: settings.base_url.clone().unwrap_or(defaults.base_url),
            api_key_env: settings.api_key_env.clone().unwrap_or(defaults.api_key_env),
            temperature: settings.temperature.unwrap_or(defaults.temperature),
            max_tokens: settings.max_tokens.unwrap_or(defaults.max_tokens),
            timeout_seconds: settings
                .timeout_seconds
                .unwrap_or(self.server.request_timeout_seconds),
        }
    }

    /// Validate configuration after parsing
    ///
    /// Called by `from_file()`; call it explicitly when building a Config
    /// through other means (e.g. in tests).
    pub fn validate(&self) -> crate::error::AppResult<()> {
        use crate::error::AppError;

        self.server.socket_addr()?;
        validate_timeout("server.request_timeout_seconds", self.server.request_timeout_seconds)?;

        if self.assistant.system_prompt.trim().is_empty() {
            return Err(AppError::Config(
                "assistant.system_prompt cannot be empty".to_string(),
            ));
        }

        for id in ProviderId::ALL {
            let endpoint = self.provider_endpoint(id);
            let section = format!("providers.{}", id);

            if endpoint.model.trim().is_empty() {
                return Err(AppError::Config(format!("{}.model cannot be empty", section)));
            }

            if !endpoint.base_url.starts_with("http://") && !endpoint.base_url.starts_with("https://")
            {
                return Err(AppError::Config(format!(
                    "{}.base_url '{}' must start with 'http://' or 'https://'",
                    section, endpoint.base_url
                )));
            }

            if endpoint.api_key_env.trim().is_empty() {
                return Err(AppError::Config(format!(
                    "{}.api_key_env cannot be empty",
                    section
                )));
            }

            if !endpoint.temperature.is_finite()
                || endpoint.temperature < 0.0
                || endpoint.temperature > 2.0
            {
                return Err(AppError::Config(format!(
                    "{}.temperature must be a finite number between 0.0 and 2.0, got {}",
                    section, endpoint.temperature
                )));
            }

            if endpoint.max_tokens == 0 {
                return Err(AppError::Config(format!(
                    "{}.max_tokens must be greater than 0",
                    section
                )));
            }

            validate_timeout(&format!("{}.timeout_seconds", section), endpoint.timeout_seconds)?;
        }

        if !LOG_LEVELS.contains(&self.observability.log_level.as_str()) {
            return Err(AppError::Config(format!(
                "observability.log_level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.observability.log_level
            )));
        }

        Ok(())
    }
}

fn validate_timeout(field: &str, timeout: u64) -> crate::error::AppResult<()> {
    if timeout == 0 {
        return Err(crate::error::AppError::Config(format!(
            "{} must be greater than 0",
            field
        )));
    }
    if timeout > MAX_TIMEOUT_SECONDS {
        return Err(crate::error::AppError::Config(format!(
            "{} cannot exceed {} seconds, got {}",
            field, MAX_TIMEOUT_SECONDS, timeout
        )));
    }
    Ok(())
}

impl FromStr for Config {
    type Err = crate::error::AppError;

    /// Parse and validate configuration from a TOML string
    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(toml_str).map_err(|source| {
            crate::error::AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            }
        })?;

        config.validate()?;
        Ok(config)
    }
}
