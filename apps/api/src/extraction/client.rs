//! Scrape API client: sends a URL plus an extraction prompt and returns the
//! structured `data.json` payload.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::http_policy::{CallPolicy, RetryPolicy};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("No URL provided for extraction")]
    MissingUrl,

    #[error("Invalid URL '{0}': expected an http(s) URL")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API Error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ExtractionError {
    /// HTTP status of the upstream response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ExtractionError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// One extraction call: target page plus a natural-language instruction.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub url: String,
    pub prompt: String,
    /// Optional structured-output hint forwarded as `jsonOptions.schema`.
    pub schema: Option<Value>,
}

impl ExtractionRequest {
    pub fn new(url: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            prompt: prompt.into(),
            schema: None,
        }
    }

    /// The JSON body sent to the scrape endpoint.
    pub fn payload(&self) -> Value {
        let mut json_options = json!({ "prompt": self.prompt.trim() });
        if let Some(schema) = &self.schema {
            json_options["schema"] = schema.clone();
        }
        json!({
            "url": self.url.trim(),
            "formats": ["json"],
            "jsonOptions": json_options,
        })
    }

    fn validate(&self) -> Result<(), ExtractionError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(ExtractionError::MissingUrl);
        }
        match url::Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
            _ => Err(ExtractionError::InvalidUrl(url.to_string())),
        }
    }
}

/// A 200 response: its status plus the `data.json` value (`Null` when absent).
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResponse {
    pub status: u16,
    pub json: Value,
}

/// Anything that can turn an `ExtractionRequest` into a raw extraction value.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, request: &ExtractionRequest)
        -> Result<ExtractionResponse, ExtractionError>;
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    data: Option<ScrapeData>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    #[serde(default)]
    json: Value,
}

/// Client for the Firecrawl-compatible `/v1/scrape` endpoint.
#[derive(Clone)]
pub struct ScrapeClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl ScrapeClient {
    pub fn new(
        api_key: Option<String>,
        api_url: impl Into<String>,
        policy: &CallPolicy,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(policy.timeout)
            .build()
            .context("Failed to build extraction HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key,
            retry: policy.retry.clone(),
        })
    }

    async fn send_once(&self, payload: &Value) -> Result<ExtractionResponse, ExtractionError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(self.api_key.as_deref().unwrap_or_default())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        debug!("Extraction response status: {}", status);
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(ExtractionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ScrapeResponse = serde_json::from_str(&body)?;
        Ok(ExtractionResponse {
            status: status.as_u16(),
            json: parsed.data.map(|d| d.json).unwrap_or(Value::Null),
        })
    }
}

#[async_trait]
impl Extractor for ScrapeClient {
    /// Validates the request, then POSTs it. Retries only when the configured
    /// policy allows and the failure is transient.
    async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResponse, ExtractionError> {
        request.validate()?;

        let payload = request.payload();
        let mut attempt = 0;

        loop {
            self.retry.backoff(attempt, "Extraction").await;

            match self.send_once(&payload).await {
                Ok(response) => return Ok(response),
                Err(e) if self.retry.has_attempts_after(attempt) && is_transient(&e) => {
                    debug!("Extraction attempt {} failed: {}", attempt + 1, e);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn is_transient(error: &ExtractionError) -> bool {
    match error {
        ExtractionError::Http(_) => true,
        ExtractionError::Api { status, .. } => StatusCode::from_u16(*status)
            .map(RetryPolicy::is_retryable_status)
            .unwrap_or(false),
        _ => false,
    }
}
