//! Command-line interface for Lumi
//!
//! Provides argument parsing and subcommand handling for the Lumi binary.

use clap::{Parser, Subcommand};

/// School assistant chat server with multi-provider fallback
#[derive(Parser)]
#[command(name = "lumi")]
#[command(version)]
#[command(about = "School assistant chat server with multi-provider fallback")]
#[command(
    long_about = "Lumi answers chat turns through Gemini, Groq, Claude or OpenRouter, \
    trying the caller's preferred provider first and falling back to the next one \
    when a provider is out of quota or has no API key configured."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# Lumi Configuration
# ==================
#
# API keys are never stored here. Each provider reads its key from the
# environment variable named by `api_key_env`. A provider without a key is
# skipped when routing.

# ─────────────────────────────────────────────────────────────────────────────
# SERVER CONFIGURATION
# ─────────────────────────────────────────────────────────────────────────────

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "0.0.0.0"

# Port to listen on
port = 3000

# Per-provider attempt timeout in seconds (overridable per provider)
request_timeout_seconds = 30

# ─────────────────────────────────────────────────────────────────────────────
# ASSISTANT PERSONA
# ─────────────────────────────────────────────────────────────────────────────

[assistant]
system_prompt = """You are Lumi, a brilliant and friendly school assistant. \
Your goal is to help students with homework, explain complex topics simply, and help with study plans. \
Use Markdown for formatting. Always be encouraging and academic but accessible."""

# ─────────────────────────────────────────────────────────────────────────────
# PROVIDERS
# ─────────────────────────────────────────────────────────────────────────────
#
# Fallback order: the requested provider first, then gemini, then the rest.
# Every field is optional; the values below are the built-in defaults.
#
# Provider fields:
#   - model: Upstream model identifier
#   - base_url: API base URL
#   - api_key_env: Environment variable holding the API key
#   - temperature: Sampling temperature (0.0-2.0)
#   - max_tokens: Maximum tokens for generation
#   - timeout_seconds: Overrides server.request_timeout_seconds

# Default provider
[providers.gemini]
model = "gemini-2.5-flash"
base_url = "https://generativelanguage.googleapis.com/v1beta"
api_key_env = "GOOGLE_API_KEY"

[providers.groq]
model = "llama-3.3-70b-versatile"
base_url = "https://api.groq.com/openai/v1"
api_key_env = "GROQ_API_KEY"

[providers.claude]
model = "claude-sonnet-4-5"
base_url = "https://api.anthropic.com/v1"
api_key_env = "ANTHROPIC_API_KEY"

[providers.openrouter]
model = "meta-llama/llama-3.3-70b-instruct"
base_url = "https://openrouter.ai/api/v1"
api_key_env = "OPENROUTER_API_KEY"
# temperature = 0.7
# max_tokens = 2048
# timeout_seconds = 60

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error"
log_level = "info"

# Log format: "pretty" for terminals, "json" for log shippers
log_format = "pretty"

# Prometheus metrics are always available at /metrics on the server port
"#
}
