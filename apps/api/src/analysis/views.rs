//! HTML view models for the form page. Rendering goes through askama
//! templates under `templates/`.

use askama::Template;
use pulldown_cmark::{html, Event, Parser};

use crate::analysis::pipeline::{AnalysisInput, AnalysisReport, EventLevel, RunState};
use crate::config::Config;
use crate::errors::AppError;
use crate::extraction::embedded_json::ExtractedRecord;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub banners: Vec<String>,
    pub linkedin_url: String,
    pub job_url: String,
    pub show_help: bool,
    pub events: Vec<EventView>,
    pub report: Option<ReportView>,
}

pub struct EventView {
    pub css_class: &'static str,
    pub message: String,
    pub detail: Option<String>,
}

pub struct ReportView {
    pub profile_json: String,
    pub job_json: String,
    /// Pitch rendered from markdown. Raw HTML in the model output is escaped.
    pub pitch_html: Option<String>,
}

impl IndexPage {
    /// Empty form, before any "Analyze" action.
    pub fn blank(config: &Config) -> Self {
        Self {
            banners: credential_banners(config),
            linkedin_url: String::new(),
            job_url: String::new(),
            show_help: true,
            events: Vec::new(),
            report: None,
        }
    }

    /// Form plus the outcome of one run. The report section only appears
    /// for a succeeded run.
    pub fn with_report(config: &Config, input: &AnalysisInput, report: &AnalysisReport) -> Self {
        let events = report
            .events
            .iter()
            .map(|e| EventView {
                css_class: match e.level {
                    EventLevel::Info => "info",
                    EventLevel::Success => "success",
                    EventLevel::Warning => "warning",
                    EventLevel::Error => "error",
                },
                message: e.message.clone(),
                detail: e.detail.clone(),
            })
            .collect();

        let report_view = match (&report.state, &report.profile, &report.job) {
            (RunState::Succeeded, Some(profile), Some(job)) => Some(ReportView {
                profile_json: pretty(profile),
                job_json: pretty(job),
                pitch_html: report.pitch.as_deref().map(markdown_to_html),
            }),
            _ => None,
        };

        Self {
            banners: credential_banners(config),
            linkedin_url: input.linkedin_url.clone(),
            job_url: input.job_url.clone(),
            show_help: false,
            events,
            report: report_view,
        }
    }

    pub fn render_html(&self) -> Result<String, AppError> {
        self.render()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to render page: {e}")))
    }
}

/// Warnings for credentials that were not configured. Key values are never
/// echoed back.
pub fn credential_banners(config: &Config) -> Vec<String> {
    let mut banners = Vec::new();
    if config.firecrawl_api_key.is_none() {
        banners.push("Firecrawl API key NOT FOUND. Extraction requests will be rejected.".to_string());
    }
    if config.openai_api_key.is_none() {
        banners.push("OpenAI API key NOT FOUND. Pitch generation will fail.".to_string());
    }
    banners
}

/// Renders model text as markdown. HTML blocks and inline tags are emitted as
/// escaped text.
pub fn markdown_to_html(markdown: &str) -> String {
    let events = Parser::new(markdown).map(|event| match event {
        Event::Html(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn pretty(record: &ExtractedRecord) -> String {
    serde_json::to_string_pretty(record).unwrap_or_else(|_| "{}".to_string())
}
