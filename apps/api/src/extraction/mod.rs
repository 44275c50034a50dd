//! Extraction: turns a profile or job URL into a decoded record.
//! Flow: build request → scrape API → locate embedded JSON → decode.

pub mod client;
pub mod embedded_json;
pub mod prompts;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::extraction::client::{ExtractionError, ExtractionRequest, Extractor};
use crate::extraction::embedded_json::{extract_embedded_json, ExtractedRecord, ParseError, ScanMode};
use crate::extraction::prompts::{JOB_EXTRACTION_PROMPT, PROFILE_EXTRACTION_PROMPT};

/// Which of the two pages a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Profile,
    Job,
}

impl Subject {
    pub fn label(self) -> &'static str {
        match self {
            Subject::Profile => "LinkedIn profile",
            Subject::Job => "job listing",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Subject::Profile => PROFILE_EXTRACTION_PROMPT,
            Subject::Job => JOB_EXTRACTION_PROMPT,
        }
    }

    pub fn request(self, url: &str) -> ExtractionRequest {
        ExtractionRequest::new(url, self.prompt())
    }

    pub fn parse_failure_message(self) -> String {
        format!("Could not parse {} response.", self.label())
    }
}

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("{}", .subject.parse_failure_message())]
    Parse {
        subject: Subject,
        status: u16,
        #[source]
        source: ParseError,
    },
}

impl AnalyzeError {
    /// HTTP status of the extraction response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            AnalyzeError::Extraction(e) => e.status(),
            AnalyzeError::Parse { status, .. } => Some(*status),
        }
    }
}

/// A decoded record and the HTTP status of the response it came from.
#[derive(Debug, Clone)]
pub struct Analyzed {
    pub status: u16,
    pub record: ExtractedRecord,
}

/// Extracts and decodes the LinkedIn profile at `url`.
pub async fn analyze_profile(
    extractor: &dyn Extractor,
    url: &str,
    mode: ScanMode,
) -> Result<Analyzed, AnalyzeError> {
    analyze(extractor, Subject::Profile, url, mode).await
}

/// Extracts and decodes the job listing at `url`.
pub async fn analyze_job(
    extractor: &dyn Extractor,
    url: &str,
    mode: ScanMode,
) -> Result<Analyzed, AnalyzeError> {
    analyze(extractor, Subject::Job, url, mode).await
}

async fn analyze(
    extractor: &dyn Extractor,
    subject: Subject,
    url: &str,
    mode: ScanMode,
) -> Result<Analyzed, AnalyzeError> {
    info!("Calling extraction API for {}: {}", subject.label(), url);
    let response = extractor.extract(&subject.request(url)).await?;
    let status = response.status;

    let record = extract_embedded_json(&response.json, mode).map_err(|source| {
        warn!("{} ({source})", subject.parse_failure_message());
        AnalyzeError::Parse {
            subject,
            status,
            source,
        }
    })?;

    Ok(Analyzed { status, record })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::client::ExtractionResponse;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Returns a canned value and remembers the requests it saw.
    struct CannedExtractor {
        response: Value,
        seen: Mutex<Vec<ExtractionRequest>>,
    }

    #[async_trait]
    impl Extractor for CannedExtractor {
        async fn extract(
            &self,
            request: &ExtractionRequest,
        ) -> Result<ExtractionResponse, ExtractionError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(ExtractionResponse {
                status: 200,
                json: self.response.clone(),
            })
        }
    }

    fn canned(response: Value) -> CannedExtractor {
        CannedExtractor {
            response,
            seen: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn test_analyze_profile_uses_profile_prompt() {
        let extractor = canned(json!({"content": "{\"Summary\": \"hi\"}"}));
        let analyzed = analyze_profile(&extractor, "https://linkedin.com/in/x", ScanMode::FirstToLast)
            .await
            .unwrap();

        assert_eq!(analyzed.status, 200);
        assert_eq!(analyzed.record["Summary"], json!("hi"));
        let seen = extractor.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].prompt.contains("LinkedIn profile"));
        assert_eq!(seen[0].url, "https://linkedin.com/in/x");
    }

    #[tokio::test]
    async fn test_analyze_job_uses_job_prompt() {
        let extractor = canned(json!({"content": "{\"Job Title\": \"Engineer\"}"}));
        let analyzed = analyze_job(&extractor, "https://example.com/job", ScanMode::FirstToLast)
            .await
            .unwrap();

        assert_eq!(analyzed.record["Job Title"], json!("Engineer"));
        assert!(extractor.seen.lock().unwrap()[0].prompt.contains("Required Skills"));
    }

    #[tokio::test]
    async fn test_parse_failure_message_is_generic() {
        let extractor = canned(json!({"content": "nothing useful"}));
        let err = analyze_job(&extractor, "https://example.com/job", ScanMode::FirstToLast)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Could not parse job listing response.");
        assert_eq!(err.status(), Some(200));
        assert!(matches!(
            err,
            AnalyzeError::Parse {
                subject: Subject::Job,
                source: ParseError::NoObject,
                ..
            }
        ));
    }

    #[test]
    fn test_subject_labels() {
        assert_eq!(
            Subject::Profile.parse_failure_message(),
            "Could not parse LinkedIn profile response."
        );
        assert_eq!(Subject::Job.label(), "job listing");
    }
}
