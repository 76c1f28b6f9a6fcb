//! Fallback behavior of the chat router against real provider adapters
//!
//! Each test wires a ProviderRegistry built from config to wiremock servers
//! and checks which providers were contacted, in which order, and what the
//! caller gets back.

use lumi::{
    config::Config,
    error::{AppError, ProviderError},
    metrics::Metrics,
    middleware::RequestId,
    providers::{ProviderId, ProviderRegistry, StaticCredentials},
    router::{ChatRouter, ChatTurn},
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GEMINI_PATH: &str = "/gemini/models/gemini-2.5-flash:generateContent";
const GROQ_PATH: &str = "/groq/chat/completions";
const CLAUDE_PATH: &str = "/claude/chat/completions";
const OPENROUTER_PATH: &str = "/openrouter/chat/completions";

fn config_for(base: &str, timeout_seconds: u64) -> Config {
    format!(
        r#"
[server]
host = "127.0.0.1"
port = 3000
request_timeout_seconds = {timeout_seconds}

[providers.gemini]
base_url = "{base}/gemini"

[providers.groq]
base_url = "{base}/groq"

[providers.claude]
base_url = "{base}/claude"

[providers.openrouter]
base_url = "{base}/openrouter"
"#
    )
    .parse()
    .expect("test config should be valid")
}

fn all_keys() -> StaticCredentials {
    StaticCredentials::new()
        .with("GOOGLE_API_KEY", "g-test")
        .with("GROQ_API_KEY", "gsk-test")
        .with("ANTHROPIC_API_KEY", "sk-ant-test")
        .with("OPENROUTER_API_KEY", "sk-or-test")
}

fn router_for(config: &Config, credentials: StaticCredentials) -> (ChatRouter, Arc<Metrics>) {
    let registry = ProviderRegistry::from_config(config, reqwest::Client::new());
    let metrics = Arc::new(Metrics::new().expect("metrics should register"));
    let router = ChatRouter::new(
        Arc::new(registry),
        Arc::new(credentials),
        config.assistant.system_prompt.clone(),
        metrics.clone(),
    );
    (router, metrics)
}

fn completion_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": text}}]
    }))
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate, calls: u64) {
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_resource_exhausted_body_falls_back_without_429() {
    let server = MockServer::start().await;
    mount(
        &server,
        GEMINI_PATH,
        ResponseTemplate::new(503).set_body_json(serde_json::json!({
            "error": {"code": 503, "message": "RESOURCE_EXHAUSTED", "status": "UNAVAILABLE"}
        })),
        1,
    )
    .await;
    mount(&server, GROQ_PATH, completion_reply("from groq"), 1).await;
    mount(&server, CLAUDE_PATH, completion_reply("unused"), 0).await;

    let (router, metrics) = router_for(&config_for(&server.uri(), 5), all_keys());
    let response = router
        .route(ChatTurn::new("hi"), RequestId::new())
        .await
        .expect("groq should answer");

    assert_eq!(response.provider, ProviderId::Groq);
    assert_eq!(response.content, "from groq");

    let output = metrics.gather().unwrap();
    assert!(output.contains("lumi_fallbacks_total{from=\"gemini\"} 1"));
    assert!(output.contains("lumi_chat_requests_total{outcome=\"success\"} 1"));
}

#[tokio::test]
async fn test_quota_on_every_provider_exhausts_in_order() {
    let server = MockServer::start().await;
    for (route, name) in [
        (OPENROUTER_PATH, "openrouter"),
        (GEMINI_PATH, "gemini"),
        (CLAUDE_PATH, "claude"),
    ] {
        mount(
            &server,
            route,
            ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"message": format!("{} quota exceeded", name)}
            })),
            1,
        )
        .await;
    }
    mount(&server, GROQ_PATH, completion_reply("unused"), 0).await;

    let (router, _) = router_for(&config_for(&server.uri(), 5), all_keys());
    let turn = ChatTurn::new("hi").with_preferred(ProviderId::OpenRouter);
    let err = router.route(turn, RequestId::new()).await.unwrap_err();

    match err {
        AppError::AllProvidersUnavailable {
            attempted,
            last_error,
        } => {
            assert_eq!(attempted, 3);
            assert!(last_error.contains("claude quota exceeded"), "got: {}", last_error);
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }

    let order: Vec<String> = server
        .received_requests()
        .await
        .expect("request recording is enabled")
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(order, vec![OPENROUTER_PATH, GEMINI_PATH, CLAUDE_PATH]);
}

#[tokio::test]
async fn test_slow_provider_times_out_and_halts() {
    let server = MockServer::start().await;
    mount(
        &server,
        GEMINI_PATH,
        ResponseTemplate::new(200)
            .set_delay(Duration::from_secs(3))
            .set_body_json(serde_json::json!({"candidates": []})),
        1,
    )
    .await;
    mount(&server, GROQ_PATH, completion_reply("unused"), 0).await;

    let (router, _) = router_for(&config_for(&server.uri(), 1), all_keys());
    let err = router
        .route(ChatTurn::new("hi"), RequestId::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Upstream(ProviderError::Timeout {
            provider: ProviderId::Gemini,
            timeout_seconds: 1
        })
    ));
}

#[tokio::test]
async fn test_unreachable_provider_halts() {
    // Nothing listens on port 9 (discard) in the test environment
    let (router, _) = router_for(&config_for("http://127.0.0.1:9", 5), all_keys());
    let err = router
        .route(ChatTurn::new("hi"), RequestId::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Upstream(ProviderError::Network {
            provider: ProviderId::Gemini,
            ..
        })
    ));
}

#[tokio::test]
async fn test_missing_key_skips_to_next_provider() {
    let server = MockServer::start().await;
    mount(&server, GEMINI_PATH, completion_reply("unused"), 0).await;
    mount(&server, GROQ_PATH, completion_reply("from groq"), 1).await;

    let credentials = StaticCredentials::new().with("GROQ_API_KEY", "gsk-test");
    let (router, metrics) = router_for(&config_for(&server.uri(), 5), credentials);
    let response = router
        .route(ChatTurn::new("hi"), RequestId::new())
        .await
        .unwrap();

    assert_eq!(response.provider, ProviderId::Groq);
    let output = metrics.gather().unwrap();
    assert!(output.contains("outcome=\"config\""));
}

#[tokio::test]
async fn test_malformed_success_body_halts() {
    let server = MockServer::start().await;
    mount(
        &server,
        GROQ_PATH,
        ResponseTemplate::new(200).set_body_string("<html>gateway</html>"),
        1,
    )
    .await;
    mount(&server, GEMINI_PATH, completion_reply("unused"), 0).await;

    let (router, _) = router_for(&config_for(&server.uri(), 5), all_keys());
    let turn = ChatTurn::new("hi").with_preferred(ProviderId::Groq);
    let err = router.route(turn, RequestId::new()).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Upstream(ProviderError::UnparseableResponse {
            provider: ProviderId::Groq,
            ..
        })
    ));
}
