use std::time::Duration;

use anyhow::{Context, Result};

use crate::extraction::embedded_json::ScanMode;
use crate::http_policy::{CallPolicy, RetryPolicy};

pub const DEFAULT_FIRECRAWL_API_URL: &str = "https://api.firecrawl.dev/v1/scrape";
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Application configuration loaded from environment variables.
///
/// Credentials are optional: a missing key is surfaced as a warning banner
/// and the outbound call then fails at the HTTP layer.
#[derive(Debug, Clone)]
pub struct Config {
    pub firecrawl_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub firecrawl_api_url: String,
    pub openai_api_url: String,
    pub extraction_policy: CallPolicy,
    pub llm_policy: CallPolicy,
    pub json_scan: ScanMode,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let retry = RetryPolicy::with_max_attempts(parse_or(&var, "HTTP_MAX_ATTEMPTS", 1u32)?);

        Ok(Config {
            firecrawl_api_key: var("FIRECRAWL_API_KEY"),
            openai_api_key: var("OPENAI_API_KEY"),
            firecrawl_api_url: var("FIRECRAWL_API_URL")
                .unwrap_or_else(|| DEFAULT_FIRECRAWL_API_URL.to_string()),
            openai_api_url: var("OPENAI_API_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_API_URL.to_string()),
            extraction_policy: CallPolicy {
                timeout: Duration::from_secs(parse_or(&var, "EXTRACTION_TIMEOUT_SECS", 60u64)?),
                retry: retry.clone(),
            },
            llm_policy: CallPolicy {
                timeout: Duration::from_secs(parse_or(&var, "LLM_TIMEOUT_SECS", 120u64)?),
                retry,
            },
            json_scan: match var("EXTRACTION_JSON_SCAN") {
                Some(raw) => raw.parse::<ScanMode>()?,
                None => ScanMode::default(),
            },
            port: parse_or(&var, "PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<F, T>(var: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        None => Ok(default),
    }
}
