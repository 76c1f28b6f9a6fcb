//! Prometheus metrics endpoint

use axum::{extract::State, http::StatusCode};

use crate::handlers::AppState;

/// Metrics handler for Prometheus scraping
///
/// - `200 OK` with metrics in Prometheus text format
/// - `500 Internal Server Error` if metrics collection fails
pub async fn handler(State(state): State<AppState>) -> (StatusCode, String) {
    match state.metrics().gather() {
        Ok(output) => (StatusCode::OK, output),
        Err(e) => {
            tracing::error!(error = %e, "Failed to gather metrics for Prometheus scraping");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to gather metrics: {}", e),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::metrics::RequestOutcome;
    use crate::providers::StaticCredentials;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_metrics_handler_returns_prometheus_format() {
        let config: Config = toml::from_str(
            r#"
[server]
host = "127.0.0.1"
port = 3000
"#,
        )
        .unwrap();
        let state =
            AppState::with_credentials(Arc::new(config), Arc::new(StaticCredentials::new()))
                .unwrap();
        state
            .metrics()
            .record_request(RequestOutcome::Success)
            .unwrap();

        let (status, body) = handler(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("# TYPE lumi_chat_requests_total counter"));
        assert!(body.contains("lumi_chat_requests_total{outcome=\"success\"} 1"));
    }
}
