use crate::analysis::pipeline::Pipeline;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Orchestrator wired with the scrape and chat clients.
    pub pipeline: Pipeline,
}
