//! Axum route handlers for the analysis form and JSON API.

use axum::{extract::State, response::Html, Form, Json};
use tracing::info;

use crate::analysis::pipeline::{AnalysisInput, AnalysisReport, RunState, MISSING_INPUT_MESSAGE};
use crate::analysis::views::IndexPage;
use crate::errors::AppError;
use crate::state::AppState;

/// GET /
///
/// The empty form with credential banners and usage help.
pub async fn handle_index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    Ok(Html(IndexPage::blank(&state.config).render_html()?))
}

/// POST /analyze
///
/// Form submission. Always re-renders the page; the outcome (warning,
/// failure or report) is part of the page.
pub async fn handle_analyze_form(
    State(state): State<AppState>,
    Form(input): Form<AnalysisInput>,
) -> Result<Html<String>, AppError> {
    let report = state.pipeline.run_isolated(input.clone()).await;
    log_outcome(&report);

    let page = IndexPage::with_report(&state.config, &input, &report);
    Ok(Html(page.render_html()?))
}

/// POST /api/v1/analyze
///
/// Same pipeline, JSON in and out. Missing URLs are a validation error
/// rather than an idle report.
pub async fn handle_analyze_api(
    State(state): State<AppState>,
    Json(input): Json<AnalysisInput>,
) -> Result<Json<AnalysisReport>, AppError> {
    if input.linkedin_url.trim().is_empty() || input.job_url.trim().is_empty() {
        return Err(AppError::Validation(MISSING_INPUT_MESSAGE.to_string()));
    }

    let report = state.pipeline.run_isolated(input).await;
    log_outcome(&report);

    Ok(Json(report))
}

fn log_outcome(report: &AnalysisReport) {
    if report.state != RunState::Idle {
        info!(
            "Run {} finished as {:?} in {}ms",
            report.run_id,
            report.state,
            (report.finished_at - report.started_at).num_milliseconds()
        );
    }
}
