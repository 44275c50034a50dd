mod analysis;
mod config;
mod errors;
mod extraction;
mod http_policy;
mod llm_client;
mod pitch;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::pipeline::Pipeline;
use crate::config::Config;
use crate::extraction::client::ScrapeClient;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career Match v{}", env!("CARGO_PKG_VERSION"));

    // Missing credentials are not fatal; the page shows a banner instead.
    if config.firecrawl_api_key.is_none() {
        warn!("FIRECRAWL_API_KEY is not set; extraction requests will be rejected upstream");
    }
    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; pitch generation will fail");
    }

    let extractor = ScrapeClient::new(
        config.firecrawl_api_key.clone(),
        config.firecrawl_api_url.clone(),
        &config.extraction_policy,
    )?;
    info!(
        "Extraction client initialized (timeout: {}s, attempts: {})",
        config.extraction_policy.timeout.as_secs(),
        config.extraction_policy.retry.max_attempts
    );

    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_api_url.clone(),
        &config.llm_policy,
    )?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let pipeline = Pipeline::new(Arc::new(extractor), Arc::new(llm), config.json_scan);
    info!("Embedded JSON scan mode: {:?}", config.json_scan);

    let state = AppState {
        config: config.clone(),
        pipeline,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
