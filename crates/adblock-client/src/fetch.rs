//! Retrying downloader for plain-text blocklist sources.

use crate::client::transport_error;
use crate::config::RetryConfig;
use adblock_core::{AdblockError, Result};
use reqwest::Client as HttpClient;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Default per-request timeout for source downloads
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Downloads blocklist sources, one entry per line.
///
/// A source that cannot be downloaded contributes no lines; the failure is
/// logged and never escapes to the caller.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    http: HttpClient,
    retry: RetryConfig,
}

impl SourceFetcher {
    /// Create a fetcher with default settings
    pub fn new() -> Result<Self> {
        SourceFetcherBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> SourceFetcherBuilder {
        SourceFetcherBuilder::new()
    }

    /// Download every URL concurrently and concatenate their lines.
    ///
    /// Lines keep the order of `urls`, then the order within each source.
    pub async fn fetch_all(&self, urls: &[String]) -> Vec<String> {
        let futures: Vec<_> = urls.iter().map(|url| self.fetch(url)).collect();
        futures_util::future::join_all(futures)
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Download one URL, returning its lines or nothing on failure
    pub async fn fetch(&self, url: &str) -> Vec<String> {
        match self.try_fetch(url).await {
            Ok(body) => {
                info!(url, size = body.len(), "Downloaded source");
                body.lines().map(str::to_string).collect()
            }
            Err(e) => {
                warn!(url, error = %e, "Dropping source");
                Vec::new()
            }
        }
    }

    /// Download one URL, retrying transport errors and 5xx responses
    #[instrument(skip(self))]
    pub async fn try_fetch(&self, url: &str) -> Result<String> {
        url::Url::parse(url).map_err(|e| AdblockError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < attempts && e.is_retryable() => {
                    let backoff = self.retry.backoff_for(attempt);
                    warn!(url, attempt, error = %e, ?backoff, "Source download failed, retrying");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(AdblockError::Fetch {
                        url: url.to_string(),
                        reason: e.to_string(),
                    })
                }
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send().await.map_err(|e| {
            // No status received: treat as a transport failure.
            match transport_error(e) {
                AdblockError::Http(msg) => AdblockError::Connection(msg),
                other => other,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdblockError::Api {
                code: status.as_u16(),
                message: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        response.text().await.map_err(|e| AdblockError::Connection(e.to_string()))
    }
}

/// Builder for configuring a [`SourceFetcher`]
#[derive(Debug)]
pub struct SourceFetcherBuilder {
    timeout: Duration,
    user_agent: String,
    retry: RetryConfig,
}

impl Default for SourceFetcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceFetcherBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("cf-adblock/{}", env!("CARGO_PKG_VERSION")),
            retry: RetryConfig::default(),
        }
    }

    /// Set the per-request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set retry configuration
    #[must_use]
    pub const fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Build the fetcher
    pub fn build(self) -> Result<SourceFetcher> {
        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| AdblockError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(SourceFetcher {
            http,
            retry: self.retry,
        })
    }
}

/// Parse a source-list file: one URL per line, `#` comments and blank lines ignored
#[must_use]
pub fn parse_source_urls(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
