//! Lumi - multi-provider chat router for a school assistant
//!
//! Answers a chat turn through one of several LLM providers, trying the
//! caller's preferred provider first and falling back in a fixed order when
//! a provider is out of quota or not configured.

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod history;
pub mod metrics;
pub mod middleware;
pub mod providers;
pub mod router;
pub mod telemetry;
