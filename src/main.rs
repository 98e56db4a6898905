//! Code execution and debugging service
//!
//! HTTP service that runs submitted code through a strategy ladder (local
//! toolchain, remote execution service, textual simulation) and decorates
//! every result with hint-service fix suggestions.

mod config;
mod hints;
mod languages;
mod orchestrator;
mod outcome;
mod probe;
mod remote;
mod runner;
mod server;
mod simulate;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("codedbg=info".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env();

    info!("Starting code debugger service...");

    let supported: Vec<&str> = languages::ALL.iter().map(|l| l.name()).collect();
    info!("Supported languages: {}", supported.join(", "));
    info!(
        "Remote execution {}, hint service {}",
        if config.remote_exec_key.is_some() {
            "configured"
        } else {
            "not configured"
        },
        if config.gemini_api_key.is_some() {
            "configured"
        } else {
            "not configured"
        },
    );

    let state = Arc::new(AppState::from_config(&config)?);
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Listening on {}", config.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
