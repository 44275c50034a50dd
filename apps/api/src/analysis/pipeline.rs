//! Analysis pipeline: one "Analyze" action from two URLs to a report.
//!
//! Flow: validate input → profile extraction → job extraction → pitch.
//! States: Idle → Running → {Succeeded, Failed}. Every run starts fresh;
//! nothing is cached between runs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::extraction::client::Extractor;
use crate::extraction::embedded_json::{ExtractedRecord, ScanMode};
use crate::extraction::{analyze_job, analyze_profile, AnalyzeError, Subject};
use crate::llm_client::ChatCompletion;
use crate::pitch::generator::{generate_pitch, PitchText};

pub const MISSING_INPUT_MESSAGE: &str =
    "Please provide both a LinkedIn profile URL and a job listing URL.";
pub const FAILED_MESSAGE: &str = "Analysis failed. Please check the URLs and try again.";
pub const SUCCEEDED_MESSAGE: &str = "Analysis complete! Here's your live match report.";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One status line shown to the user while (and after) the run proceeds.
#[derive(Debug, Clone, Serialize)]
pub struct StatusEvent {
    pub level: EventLevel,
    pub message: String,
    /// Preformatted supplementary text, e.g. the request payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Form / JSON input for one run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisInput {
    #[serde(default)]
    pub linkedin_url: String,
    #[serde(default)]
    pub job_url: String,
}

/// Outcome of a run. `profile` and `job` are only set when `state` is
/// `Succeeded`; partial results of a failed run are dropped.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub state: RunState,
    pub events: Vec<StatusEvent>,
    pub profile: Option<ExtractedRecord>,
    pub job: Option<ExtractedRecord>,
    pub pitch: Option<PitchText>,
    pub failure: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Run bookkeeping
// ────────────────────────────────────────────────────────────────────────────

struct Run {
    report: AnalysisReport,
}

impl Run {
    fn start() -> Self {
        let now = Utc::now();
        Self {
            report: AnalysisReport {
                run_id: Uuid::new_v4(),
                started_at: now,
                finished_at: now,
                state: RunState::Idle,
                events: Vec::new(),
                profile: None,
                job: None,
                pitch: None,
                failure: None,
            },
        }
    }

    fn push(&mut self, level: EventLevel, message: impl Into<String>, detail: Option<String>) {
        self.report.events.push(StatusEvent {
            level,
            message: message.into(),
            detail,
        });
    }

    fn transition(&mut self, to: RunState) {
        debug_assert!(
            matches!(
                (self.report.state, to),
                (RunState::Idle, RunState::Running)
                    | (RunState::Running, RunState::Succeeded)
                    | (RunState::Running, RunState::Failed)
            ),
            "invalid run transition {:?} -> {:?}",
            self.report.state,
            to
        );
        self.report.state = to;
    }

    fn succeed(
        mut self,
        profile: ExtractedRecord,
        job: ExtractedRecord,
        pitch: Option<PitchText>,
    ) -> AnalysisReport {
        self.transition(RunState::Succeeded);
        self.push(EventLevel::Success, SUCCEEDED_MESSAGE, None);
        self.report.profile = Some(profile);
        self.report.job = Some(job);
        self.report.pitch = pitch;
        self.finish()
    }

    fn fail(mut self, message: String) -> AnalysisReport {
        self.transition(RunState::Failed);
        self.push(EventLevel::Error, message.clone(), None);
        self.report.failure = Some(message);
        self.finish()
    }

    fn finish(mut self) -> AnalysisReport {
        self.report.finished_at = Utc::now();
        self.report
    }
}

/// Report for a run that could not complete because the task itself died.
fn unexpected_failure(message: String) -> AnalysisReport {
    let mut run = Run::start();
    run.transition(RunState::Running);
    run.fail(format!("Unexpected error: {message}"))
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// The orchestrator. Holds the two remote collaborators and the embedded
/// JSON scan mode; cheap to clone.
#[derive(Clone)]
pub struct Pipeline {
    extractor: Arc<dyn Extractor>,
    chat: Arc<dyn ChatCompletion>,
    scan: ScanMode,
}

impl Pipeline {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        chat: Arc<dyn ChatCompletion>,
        scan: ScanMode,
    ) -> Self {
        Self {
            extractor,
            chat,
            scan,
        }
    }

    /// Runs on a separate task so that a panic anywhere in the run becomes a
    /// `Failed` report instead of tearing down the request.
    pub async fn run_isolated(&self, input: AnalysisInput) -> AnalysisReport {
        let pipeline = self.clone();
        match tokio::spawn(async move { pipeline.run(&input).await }).await {
            Ok(report) => report,
            Err(e) => {
                error!("Analysis task aborted: {e}");
                unexpected_failure(e.to_string())
            }
        }
    }

    /// Runs the pipeline once. Never returns an error: every failure is
    /// recorded in the report.
    pub async fn run(&self, input: &AnalysisInput) -> AnalysisReport {
        let mut run = Run::start();

        let linkedin_url = input.linkedin_url.trim();
        let job_url = input.job_url.trim();

        if linkedin_url.is_empty() || job_url.is_empty() {
            run.push(EventLevel::Warning, MISSING_INPUT_MESSAGE, None);
            return run.finish();
        }

        run.transition(RunState::Running);
        info!("Run {} started", run.report.run_id);

        // Both extractions are attempted even if the first fails.
        let profile = self.extract(&mut run, Subject::Profile, linkedin_url).await;
        let job = self.extract(&mut run, Subject::Job, job_url).await;

        let (profile, job) = match (profile, job) {
            (Some(profile), Some(job)) => (profile, job),
            _ => {
                warn!("Run {} failed: missing extraction result", run.report.run_id);
                return run.fail(FAILED_MESSAGE.to_string());
            }
        };

        let pitch = match generate_pitch(self.chat.as_ref(), &profile, &job).await {
            Ok(pitch) => {
                run.push(EventLevel::Success, "Pitch generated.", None);
                Some(pitch)
            }
            Err(e) => {
                warn!("Pitch generation failed: {e}");
                run.push(EventLevel::Error, format!("Pitch generation failed: {e}"), None);
                None
            }
        };

        info!("Run {} succeeded", run.report.run_id);
        run.succeed(profile, job, pitch)
    }

    async fn extract(
        &self,
        run: &mut Run,
        subject: Subject,
        url: &str,
    ) -> Option<ExtractedRecord> {
        let payload = serde_json::to_string_pretty(&subject.request(url).payload()).ok();
        run.push(
            EventLevel::Info,
            format!("Calling extraction API for {}...", subject.label()),
            payload,
        );

        let result = match subject {
            Subject::Profile => analyze_profile(self.extractor.as_ref(), url, self.scan).await,
            Subject::Job => analyze_job(self.extractor.as_ref(), url, self.scan).await,
        };

        let status = match &result {
            Ok(analyzed) => Some(analyzed.status),
            Err(e) => e.status(),
        };
        if let Some(status) = status {
            run.push(EventLevel::Info, format!("Response status: {status}"), None);
        }

        match result {
            Ok(analyzed) => {
                let message = format!("{} loaded.", capitalize(subject.label()));
                run.push(EventLevel::Success, message, None);
                Some(analyzed.record)
            }
            Err(e) => {
                if let AnalyzeError::Extraction(inner) = &e {
                    warn!("Extraction for {} failed: {inner}", subject.label());
                }
                run.push(EventLevel::Error, e.to_string(), None);
                None
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
