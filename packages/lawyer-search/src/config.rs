use anyhow::{Context, Result};
use dotenvy::dotenv;
use llm_client::{LlmClient, API_KEY_VAR, DEFAULT_BASE_URL, DEFAULT_MODEL};
use std::env;
use std::time::Duration;

use crate::fetcher::{HttpFetcher, DEFAULT_USER_AGENT};

/// Configuration loaded from environment variables
#[derive(Clone)]
pub struct Config {
    /// Only needed for the judge strategy
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_timeout: Duration,
    pub fetch_user_agent: String,
    pub fetch_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("llm_api_key", &self.llm_api_key.as_ref().map(|_| "<redacted>"))
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("llm_timeout", &self.llm_timeout)
            .field("fetch_user_agent", &self.fetch_user_agent)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup (environment, test map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            llm_api_key: lookup(API_KEY_VAR).filter(|k| !k.trim().is_empty()),
            llm_base_url: lookup("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            llm_model: lookup("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_timeout: seconds(&lookup, "LLM_TIMEOUT_SECS", 60)?,
            fetch_user_agent: lookup("FETCH_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            fetch_timeout: seconds(&lookup, "FETCH_TIMEOUT_SECS", 30)?,
        })
    }

    /// Chat client for the judge. Fails when no API key is configured.
    pub fn llm_client(&self) -> Result<LlmClient> {
        let api_key = self
            .llm_api_key
            .clone()
            .with_context(|| format!("{} must be set to use the judge strategy", API_KEY_VAR))?;
        let http_client = reqwest::Client::builder()
            .timeout(self.llm_timeout)
            .build()
            .context("Failed to create LLM HTTP client")?;

        Ok(LlmClient::new(api_key)
            .with_base_url(&self.llm_base_url)
            .with_http_client(http_client))
    }

    pub fn http_fetcher(&self) -> Result<HttpFetcher> {
        HttpFetcher::with_options(&self.fetch_user_agent, self.fetch_timeout)
            .context("Failed to create HTTP fetcher")
    }
}

fn seconds(lookup: impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<Duration> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Duration::from_secs)
            .with_context(|| format!("{} must be a whole number of seconds", key)),
        None => Ok(Duration::from_secs(default)),
    }
}
