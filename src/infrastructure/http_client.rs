//! Blocking HTTP fetcher for personal detail pages
//!
//! Plugs into the engine as a [`DetailPageResolver`]. Requests fail fast:
//! no retry and no rate limiting here, callers wrap the resolver when they
//! need either.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::parsing::DetailPageResolver;
use super::parsing_error::{ExtractionError, ExtractionResult};

/// HTTP client configuration for detail page fetching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Whether to follow redirects
    pub follow_redirects: bool,
    pub max_redirects: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "contact-miner/0.2 (directory research)".to_string(),
            timeout_seconds: 30,
            follow_redirects: true,
            max_redirects: 10,
        }
    }
}

/// Fetches detail pages with a blocking `reqwest` client
pub struct HttpDetailPageResolver {
    client: Client,
    config: HttpClientConfig,
}

impl HttpDetailPageResolver {
    /// Create a new resolver with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(config.max_redirects)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        info!(
            "Detail page resolver ready (timeout {}s, redirects {})",
            config.timeout_seconds, config.follow_redirects
        );
        Ok(Self { client, config })
    }

    /// Get the configuration
    pub const fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

impl DetailPageResolver for HttpDetailPageResolver {
    fn resolve_detail_page(&self, url: &str) -> ExtractionResult<String> {
        debug!("Fetching detail page: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| ExtractionError::detail_page_fetch_failed(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::detail_page_fetch_failed(
                url,
                format!("HTTP status {status}"),
            ));
        }

        let text = response
            .text()
            .map_err(|e| ExtractionError::detail_page_fetch_failed(url, e.to_string()))?;
        debug!("Fetched detail page: {} ({} chars)", url, text.len());
        Ok(text)
    }
}
