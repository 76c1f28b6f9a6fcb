//! Lumi HTTP server
//!
//! Starts an Axum web server that answers chat turns through the configured
//! LLM providers.

use clap::Parser;
use lumi::{
    cli::{Cli, Command, generate_config_template},
    config::Config,
    handlers::{self, AppState},
    telemetry,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = cli.command {
        return write_config_template(output.as_deref());
    }

    let config = Config::from_file(&cli.config)?;

    telemetry::init(&config.observability.log_level, config.observability.log_format);

    tracing::info!(
        "Starting Lumi server on {}:{}",
        config.server.host,
        config.server.port
    );

    let addr = config.server.socket_addr()?;

    let state = AppState::new(Arc::new(config))?;
    for id in lumi::providers::ProviderId::ALL {
        if state.router().is_configured(id) {
            tracing::info!(provider = %id, "Provider configured");
        } else {
            tracing::warn!(
                provider = %id,
                env_var = %state.config().provider_endpoint(id).api_key_env(),
                "Provider has no API key and will be skipped"
            );
        }
    }

    let app = handlers::app(state);

    tracing::info!("Listening on {}", addr);
    tracing::info!("Chat endpoint available at http://{}/chat", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn write_config_template(output: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let template = generate_config_template();
    match output {
        Some(path) => {
            std::fs::write(path, template)?;
            eprintln!("Wrote configuration template to {}", path);
        }
        None => print!("{}", template),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
