//! Cloudflare Zero Trust Gateway API client.

use crate::api::{ListsApi, RulesApi};
use crate::config::RateLimitConfig;
use adblock_core::{AdblockError, Result};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, RETRY_AFTER};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// The Cloudflare API base URL
const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Cloudflare Zero Trust Gateway client
///
/// Cheap to clone; clones share the HTTP connection pool and the rate limiter.
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    account_id: String,
    base_url: String,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("account_id", &self.inner.account_id)
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

/// Response envelope shared by every Cloudflare v4 endpoint
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    message: String,
}

impl<T> Envelope<T> {
    fn error_message(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl GatewayClient {
    /// Create a builder for the given API token and account identifier
    #[must_use]
    pub fn builder(
        api_token: impl Into<String>,
        account_id: impl Into<String>,
    ) -> GatewayClientBuilder {
        GatewayClientBuilder::new(api_token, account_id)
    }

    /// Account the client operates on
    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.inner.account_id
    }

    /// Access gateway list endpoints
    #[must_use]
    pub fn lists(&self) -> ListsApi<'_> {
        ListsApi::new(self)
    }

    /// Access gateway rule endpoints
    #[must_use]
    pub fn rules(&self) -> RulesApi<'_> {
        RulesApi::new(self)
    }

    /// Perform a GET request
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.build_url(path);
        debug!(url = %url, "GET request");
        self.inner.rate_limiter.until_ready().await;

        let response = self
            .inner
            .http
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        self.handle_response(response).await
    }

    /// Perform a POST request with JSON body
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.build_url(path);
        debug!(url = %url, "POST request");
        self.inner.rate_limiter.until_ready().await;

        let response = self
            .inner
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        self.handle_response(response).await
    }

    /// Perform a PUT request with JSON body
    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.build_url(path);
        debug!(url = %url, "PUT request");
        self.inner.rate_limiter.until_ready().await;

        let response = self
            .inner
            .http
            .put(&url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        self.handle_response(response).await
    }

    /// Perform a DELETE request
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let url = self.build_url(path);
        debug!(url = %url, "DELETE request");
        self.inner.rate_limiter.until_ready().await;

        let response = self
            .inner
            .http
            .delete(&url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return self.handle_error(status.as_u16(), response).await;
        }

        let body = response.text().await.map_err(transport_error)?;
        if body.trim().is_empty() {
            return Ok(());
        }
        let envelope: Envelope<serde_json::Value> = serde_json::from_str(&body)?;
        if envelope.success {
            Ok(())
        } else {
            Err(AdblockError::Api {
                code: status.as_u16(),
                message: envelope.error_message(),
            })
        }
    }

    /// Build an account-scoped gateway URL
    fn build_url(&self, path: &str) -> String {
        format!(
            "{}/accounts/{}/gateway{}",
            self.inner.base_url, self.inner.account_id, path
        )
    }

    /// Unwrap the `result` of a successful envelope
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            return self.handle_error(status.as_u16(), response).await;
        }

        let body = response.text().await.map_err(transport_error)?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;

        if !envelope.success {
            return Err(AdblockError::Api {
                code: status.as_u16(),
                message: envelope.error_message(),
            });
        }

        envelope
            .result
            .ok_or_else(|| AdblockError::Internal("response envelope carried no result".into()))
    }

    /// Convert an error response to an [`AdblockError`]
    async fn handle_error<T>(&self, status: u16, response: reqwest::Response) -> Result<T> {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let body = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
            .ok()
            .map(|e| e.error_message())
            .filter(|m| !m.is_empty())
            .unwrap_or(body);

        match status {
            401 | 403 => Err(AdblockError::Unauthorized),
            404 => Err(AdblockError::NotFound { resource: message }),
            429 => {
                warn!(?retry_after, "Rate limited by Cloudflare API");
                Err(AdblockError::RateLimited { retry_after })
            }
            _ => Err(AdblockError::Api {
                code: status,
                message,
            }),
        }
    }
}

/// Classify a reqwest failure
pub(crate) fn transport_error(e: reqwest::Error) -> AdblockError {
    if e.is_timeout() {
        AdblockError::Timeout(e.to_string())
    } else if e.is_connect() {
        AdblockError::Connection(e.to_string())
    } else if e.is_decode() {
        AdblockError::Internal(e.to_string())
    } else {
        AdblockError::Http(e.to_string())
    }
}

/// Builder for configuring a [`GatewayClient`]
#[derive(Debug)]
pub struct GatewayClientBuilder {
    api_token: String,
    account_id: String,
    base_url: String,
    timeout: Duration,
    user_agent: String,
    rate_limit: RateLimitConfig,
}

impl GatewayClientBuilder {
    /// Create a new builder with the given credentials
    #[must_use]
    pub fn new(api_token: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            account_id: account_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("cf-adblock/{}", env!("CARGO_PKG_VERSION")),
            rate_limit: RateLimitConfig::default(),
        }
    }

    /// Set the base URL (useful for testing)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout
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

    /// Set the client-side rate limit
    #[must_use]
    pub const fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<GatewayClient> {
        if self.api_token.is_empty() || self.account_id.is_empty() {
            return Err(AdblockError::Config(
                "API token and account id are both required".into(),
            ));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| AdblockError::Config(format!("invalid base URL {}: {e}", self.base_url)))?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.api_token))
            .map_err(|_| AdblockError::Config("API token contains invalid characters".into()))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .default_headers(headers)
            .gzip(true)
            .build()
            .map_err(|e| AdblockError::Config(format!("failed to build HTTP client: {e}")))?;

        let quota = Quota::per_second(
            NonZeroU32::new(self.rate_limit.requests_per_second).unwrap_or(NonZeroU32::MIN),
        )
        .allow_burst(NonZeroU32::new(self.rate_limit.burst_size).unwrap_or(NonZeroU32::MIN));

        Ok(GatewayClient {
            inner: Arc::new(ClientInner {
                http,
                account_id: self.account_id,
                base_url: self.base_url.trim_end_matches('/').to_string(),
                rate_limiter: RateLimiter::direct(quota),
            }),
        })
    }
}
