//! Prometheus metrics collection for Lumi
//!
//! Tracks:
//! - chat requests by outcome
//! - provider attempts by provider and outcome
//! - provider round-trip latency
//! - fallbacks from one provider to the next
//!
//! Metrics are exposed via the `/metrics` endpoint in Prometheus text format.

use crate::providers::{FailureClass, ProviderId};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Final outcome of a chat request, as a metric label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Success,
    /// Rejected before any provider was contacted
    Validation,
    /// A provider failed in a way that stopped the fallback chain
    Upstream,
    /// Every provider was skipped for quota or configuration
    Exhausted,
}

impl RequestOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestOutcome::Success => "success",
            RequestOutcome::Validation => "validation",
            RequestOutcome::Upstream => "upstream",
            RequestOutcome::Exhausted => "exhausted",
        }
    }
}

/// Outcome of one provider attempt, as a metric label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Failed(FailureClass),
}

impl AttemptOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptOutcome::Success => "success",
            AttemptOutcome::Failed(class) => class.as_str(),
        }
    }
}

/// Metrics collector for Lumi
#[derive(Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,
    chat_requests: IntCounterVec,
    provider_attempts: IntCounterVec,
    provider_latency: HistogramVec,
    fallbacks: IntCounterVec,
    metrics_recording_failures: IntCounterVec,
}

impl Metrics {
    /// Create a new Metrics instance with its own registry
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails (e.g., duplicate names).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Cardinality: 4 outcomes
        let chat_requests = IntCounterVec::new(
            Opts::new("lumi_chat_requests_total", "Total chat requests by outcome"),
            &["outcome"],
        )?;

        // Cardinality: 4 providers x 4 outcomes
        let provider_attempts = IntCounterVec::new(
            Opts::new(
                "lumi_provider_attempts_total",
                "Provider attempts by provider and outcome (success, quota, config, upstream)",
            ),
            &["provider", "outcome"],
        )?;

        let provider_latency = HistogramVec::new(
            HistogramOpts::new(
                "lumi_provider_latency_ms",
                "Provider round-trip latency in milliseconds, network attempts only",
            )
            .buckets(vec![
                50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0,
            ]),
            &["provider"],
        )?;

        let fallbacks = IntCounterVec::new(
            Opts::new(
                "lumi_fallbacks_total",
                "Times a provider was skipped in favour of the next candidate",
            ),
            &["from"],
        )?;

        let metrics_recording_failures = IntCounterVec::new(
            Opts::new(
                "lumi_metrics_recording_failures_total",
                "Metrics recording operation failures by operation",
            ),
            &["operation"],
        )?;

        registry.register(Box::new(chat_requests.clone()))?;
        registry.register(Box::new(provider_attempts.clone()))?;
        registry.register(Box::new(provider_latency.clone()))?;
        registry.register(Box::new(fallbacks.clone()))?;
        registry.register(Box::new(metrics_recording_failures.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            chat_requests,
            provider_attempts,
            provider_latency,
            fallbacks,
            metrics_recording_failures,
        })
    }

    pub fn record_request(&self, outcome: RequestOutcome) -> Result<(), prometheus::Error> {
        self.chat_requests
            .get_metric_with_label_values(&[outcome.as_str()])?
            .inc();
        Ok(())
    }

    pub fn record_attempt(
        &self,
        provider: ProviderId,
        outcome: AttemptOutcome,
    ) -> Result<(), prometheus::Error> {
        self.provider_attempts
            .get_metric_with_label_values(&[provider.as_str(), outcome.as_str()])?
            .inc();
        Ok(())
    }

    /// Record provider latency
    ///
    /// # Errors
    ///
    /// Rejects NaN, infinite and negative values; they corrupt histogram
    /// percentiles.
    pub fn record_latency(
        &self,
        provider: ProviderId,
        duration_ms: f64,
    ) -> Result<(), prometheus::Error> {
        if !duration_ms.is_finite() || duration_ms < 0.0 {
            return Err(prometheus::Error::Msg(format!(
                "Histogram value must be finite and non-negative, got: {}",
                duration_ms
            )));
        }

        self.provider_latency
            .get_metric_with_label_values(&[provider.as_str()])?
            .observe(duration_ms);
        Ok(())
    }

    pub fn record_fallback(&self, from: ProviderId) -> Result<(), prometheus::Error> {
        self.fallbacks
            .get_metric_with_label_values(&[from.as_str()])?
            .inc();
        Ok(())
    }

    /// Count a failed recording operation (never fails itself)
    pub fn metrics_recording_failure(&self, operation: &str) {
        self.metrics_recording_failures
            .with_label_values(&[operation])
            .inc();
    }

    /// Total metrics recording failures since startup
    pub fn metrics_recording_failures_count(&self) -> u64 {
        self.registry
            .gather()
            .iter()
            .find(|mf| mf.name() == "lumi_metrics_recording_failures_total")
            .map(|mf| {
                mf.get_metric()
                    .iter()
                    .map(|m| m.counter.value.unwrap_or(0.0) as u64)
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Encode all metrics in Prometheus text format
    ///
    /// # Errors
    ///
    /// Returns an error if metric encoding fails.
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer)?;

        String::from_utf8(buffer).map_err(|e| {
            prometheus::Error::Msg(format!(
                "Failed to convert metrics to UTF-8 at byte {}: {}",
                e.utf8_error().valid_up_to(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_request_increments_counter() {
        let metrics = Metrics::new().expect("Failed to create test metrics");
        metrics.record_request(RequestOutcome::Success).unwrap();
        metrics.record_request(RequestOutcome::Exhausted).unwrap();

        let output = metrics.gather().expect("Failed to gather test metrics");
        assert!(output.contains("lumi_chat_requests_total{outcome=\"success\"} 1"));
        assert!(output.contains("lumi_chat_requests_total{outcome=\"exhausted\"} 1"));
    }

    #[test]
    fn test_record_attempt_uses_failure_class_labels() {
        let metrics = Metrics::new().unwrap();
        metrics
            .record_attempt(ProviderId::Groq, AttemptOutcome::Failed(FailureClass::Quota))
            .unwrap();
        metrics
            .record_attempt(ProviderId::Gemini, AttemptOutcome::Success)
            .unwrap();

        let output = metrics.gather().unwrap();
        assert!(output.contains("provider=\"groq\""));
        assert!(output.contains("outcome=\"quota\""));
        assert!(output.contains("provider=\"gemini\""));
        assert!(output.contains("outcome=\"success\""));
    }

    #[test]
    fn test_record_fallback() {
        let metrics = Metrics::new().unwrap();
        metrics.record_fallback(ProviderId::Claude).unwrap();
        let output = metrics.gather().unwrap();
        assert!(output.contains("lumi_fallbacks_total{from=\"claude\"} 1"));
    }

    #[test]
    fn test_latency_rejects_invalid_values() {
        let metrics = Metrics::new().unwrap();
        assert!(metrics.record_latency(ProviderId::Gemini, f64::NAN).is_err());
        assert!(metrics.record_latency(ProviderId::Gemini, f64::INFINITY).is_err());
        assert!(metrics.record_latency(ProviderId::Gemini, -1.0).is_err());
        assert!(metrics.record_latency(ProviderId::Gemini, 0.0).is_ok());
        assert!(metrics.record_latency(ProviderId::Gemini, 812.5).is_ok());

        let output = metrics.gather().unwrap();
        assert!(output.contains("lumi_provider_latency_ms_count{provider=\"gemini\"} 2"));
    }

    #[test]
    fn test_metrics_recording_failures_count() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.metrics_recording_failures_count(), 0);
        metrics.metrics_recording_failure("record_attempt");
        metrics.metrics_recording_failure("record_latency");
        assert_eq!(metrics.metrics_recording_failures_count(), 2);
    }

    #[test]
    fn test_metrics_is_clonable() {
        let metrics = Metrics::new().unwrap();
        let clone = metrics.clone();
        clone.record_request(RequestOutcome::Validation).unwrap();
        // Clones share the registry
        assert!(metrics.gather().unwrap().contains("outcome=\"validation\""));
    }
}
