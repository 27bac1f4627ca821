mod config;
mod errors;
mod extraction;
mod jobs;
mod llm_client;
mod models;
mod routes;
mod shortlisting;
mod state;
mod tools;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::ResumeExtractor;
use crate::jobs::registry::JobRegistry;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::shortlisting::phase2::Phase2Reviewer;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Shortlister v{}", env!("CARGO_PKG_VERSION"));

    // Upload directory must exist before the first request
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Cannot create upload dir {}", config.upload_dir.display()))?;
    info!("Upload dir: {}", config.upload_dir.display());

    // Initialize LLM client
    let llm = LlmClient::new(
        config.ollama_base_url.clone(),
        config.ollama_model.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    info!(
        "LLM client initialized (url: {}, model: {}, timeout: {}s)",
        config.ollama_base_url, config.ollama_model, config.llm_timeout_secs
    );

    // Build app state
    let state = AppState {
        jobs: JobRegistry::new(),
        extractor: ResumeExtractor::new(config.upload_dir.clone()),
        reviewer: Arc::new(Phase2Reviewer::new(Arc::new(llm))),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(&config.cors_origins));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// CORS restricted to the configured frontend origins.
fn build_cors(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{origin}'");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
