//! Tests for loading configuration from disk
//!
//! Verifies the three loading phases (read, parse, validate) report the
//! file path and keep the underlying error as `source()`.

use lumi::cli::generate_config_template;
use lumi::config::{Config, LogFormat};
use lumi::error::AppError;
use lumi::providers::ProviderId;
use std::error::Error;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("should create temp file");
    file.write_all(contents.as_bytes())
        .expect("should write temp config");
    file
}

#[test]
fn test_generated_template_loads_from_disk() {
    let file = write_config(generate_config_template());
    let config = Config::from_file(file.path()).expect("template should load");

    assert_eq!(config.server.port, 3000);
    assert_eq!(config.observability.log_format, LogFormat::Pretty);
    for id in ProviderId::ALL {
        let endpoint = config.provider_endpoint(id);
        assert_eq!(endpoint.model(), id.default_model());
        assert_eq!(endpoint.api_key_env(), id.default_api_key_env());
    }
}

#[test]
fn test_missing_file_preserves_io_error() {
    let err = Config::from_file("/nonexistent/path/to/lumi.toml").unwrap_err();

    assert!(matches!(err, AppError::ConfigFileRead { .. }));
    assert!(err.to_string().contains("/nonexistent/path/to/lumi.toml"));
    let source = err.source().expect("should have source error");
    assert!(source.is::<std::io::Error>());
}

#[test]
fn test_invalid_toml_preserves_parse_error() {
    let file = write_config("this is [[[[ not valid toml");
    let err = Config::from_file(file.path()).unwrap_err();

    assert!(matches!(err, AppError::ConfigParseFailed { .. }));
    let source = err.source().expect("should have source error");
    assert!(source.is::<toml::de::Error>());
}

#[test]
fn test_invalid_values_report_path_and_reason() {
    let file = write_config(
        r#"
[server]
host = "127.0.0.1"
port = 3000

[providers.groq]
temperature = 3.5
"#,
    );
    let err = Config::from_file(file.path()).unwrap_err();

    match &err {
        AppError::ConfigValidationFailed { path, reason } => {
            assert_eq!(path, &file.path().display().to_string());
            assert!(reason.contains("providers.groq.temperature"), "got: {}", reason);
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[test]
fn test_provider_override_from_disk() {
    let file = write_config(
        r#"
[server]
host = "0.0.0.0"
port = 8080
request_timeout_seconds = 45

[assistant]
system_prompt = "You are Lumi."

[providers.openrouter]
model = "google/gemma-3-27b-it"
api_key_env = "LUMI_OPENROUTER_KEY"
timeout_seconds = 90

[observability]
log_level = "debug"
log_format = "json"
"#,
    );
    let config = Config::from_file(file.path()).unwrap();

    let openrouter = config.provider_endpoint(ProviderId::OpenRouter);
    assert_eq!(openrouter.model(), "google/gemma-3-27b-it");
    assert_eq!(openrouter.api_key_env(), "LUMI_OPENROUTER_KEY");
    assert_eq!(openrouter.timeout_seconds(), 90);
    assert_eq!(config.provider_endpoint(ProviderId::Gemini).timeout_seconds(), 45);
    assert_eq!(config.assistant.system_prompt, "You are Lumi.");
    assert_eq!(config.observability.log_format, LogFormat::Json);
}

#[test]
fn test_hostname_rejected_with_path_and_field() {
    let file = write_config(
        r#"
[server]
host = "localhost"
port = 3000
"#,
    );
    let err = Config::from_file(file.path()).unwrap_err();

    match &err {
        AppError::ConfigValidationFailed { path, reason } => {
            assert_eq!(path, &file.path().display().to_string());
            assert!(reason.contains("server.host"), "got: {}", reason);
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[test]
fn test_misspelled_provider_field_rejected_from_disk() {
    let file = write_config(
        r#"
[server]
host = "127.0.0.1"
port = 3000

[providers.claude]
max_token = 10
"#,
    );
    let err = Config::from_file(file.path()).unwrap_err();

    assert!(matches!(err, AppError::ConfigParseFailed { .. }));
    let source = err.source().expect("should have source error");
    assert!(source.to_string().contains("max_token"), "got: {}", source);
}
