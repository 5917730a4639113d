// # Kitsu HTTP API Client
//
// `reqwest`-based implementation of `ShortenerApi` against the shortening
// service's request contract:
//
// | Operation | Method | Path                         | Success        |
// |-----------|--------|------------------------------|----------------|
// | Create    | POST   | `/shorten`                   | 2xx + record   |
// | Delete    | DELETE | `/shorten/{code}`            | 204 exactly    |
// | Update    | PUT    | `/shorten/{code}`            | 2xx + record   |
// | Stats     | GET    | `/shorten/{code}/stats`      | 2xx + count    |
// | Redirect  | —      | `/shorten/r/{code}`          | display-only   |
//
// ## Responsibility split
//
// This layer is stateless and single-shot: one HTTP request per call,
// idempotent request construction, no side effects on failure. It performs
// NO retries, NO caching and spawns NO tasks: retry policy belongs to the
// caller, and all state belongs to the `HistoryManager` / `HistoryStore`.
// Any response other than the expected success status maps to
// `Error::Network`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kitsu_core::error::{Error, Result};
use kitsu_core::model::LinkRecord;
use kitsu_core::traits::ShortenerApi;

/// Default HTTP timeout for API requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Default service base URL (the development fallback of the original app)
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base address of the shortening service; all paths are relative to it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Create a configuration for the given base URL with default timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::config("API base URL cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::config("API timeout must be > 0"));
        }
        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT.as_secs()
}

/// Request body for create and update calls
#[derive(Debug, Serialize)]
struct UrlPayload<'a> {
    url: &'a str,
}

/// Wire shape of a link record as returned by the service
///
/// Tolerates extra fields; `createdAt` is optional because the reference
/// server omits it on update responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRecord {
    short_code: String,
    url: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    access_count: Option<u64>,
}

impl From<WireRecord> for LinkRecord {
    fn from(wire: WireRecord) -> Self {
        LinkRecord {
            short_code: wire.short_code,
            long_url: wire.url,
            created_at: wire.created_at.unwrap_or_else(Utc::now),
            updated_at: wire.updated_at,
            access_count: wire.access_count,
        }
    }
}

/// Wire shape of a stats response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStats {
    access_count: u64,
}

/// HTTP client for the shortening service
///
/// The client is built once with a timeout and shared across calls; each
/// call constructs its request independently.
#[derive(Debug, Clone)]
pub struct HttpShortenerApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpShortenerApi {
    /// Create a client from configuration
    pub fn new(config: ApiConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// The configured service base URL (normalized, no trailing slash)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn shorten_url(&self) -> String {
        format!("{}/shorten", self.base_url)
    }

    fn code_url(&self, short_code: &str) -> String {
        format!("{}/shorten/{}", self.base_url, short_code)
    }

    fn stats_url(&self, short_code: &str) -> String {
        format!("{}/shorten/{}/stats", self.base_url, short_code)
    }

    /// Turn a non-success response into a network error carrying the status
    /// and whatever body the server sent
    async fn response_error(operation: &str, response: reqwest::Response) -> Error {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        Error::network(format!("{} failed: {} - {}", operation, status, body))
    }
}

#[async_trait]
impl ShortenerApi for HttpShortenerApi {
    async fn create(&self, url: &str) -> Result<LinkRecord> {
        tracing::debug!("POST {} ({})", self.shorten_url(), url);

        let response = self
            .client
            .post(self.shorten_url())
            .json(&UrlPayload { url })
            .send()
            .await
            .map_err(|e| Error::network(format!("create request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::response_error("create", response).await);
        }

        let wire: WireRecord = response
            .json()
            .await
            .map_err(|e| Error::network(format!("create: invalid response body: {}", e)))?;
        Ok(wire.into())
    }

    async fn remove(&self, short_code: &str) -> Result<()> {
        tracing::debug!("DELETE {}", self.code_url(short_code));

        let response = self
            .client
            .delete(self.code_url(short_code))
            .send()
            .await
            .map_err(|e| Error::network(format!("delete request failed: {}", e)))?;

        // The contract is an explicit "no content"; any other status, even a
        // 2xx with a body, is not a confirmed delete.
        if response.status() != reqwest::StatusCode::NO_CONTENT {
            return Err(Self::response_error("delete", response).await);
        }
        Ok(())
    }

    async fn update(&self, short_code: &str, url: &str) -> Result<LinkRecord> {
        tracing::debug!("PUT {} ({})", self.code_url(short_code), url);

        let response = self
            .client
            .put(self.code_url(short_code))
            .json(&UrlPayload { url })
            .send()
            .await
            .map_err(|e| Error::network(format!("update request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::response_error("update", response).await);
        }

        let wire: WireRecord = response
            .json()
            .await
            .map_err(|e| Error::network(format!("update: invalid response body: {}", e)))?;
        Ok(wire.into())
    }

    async fn stats(&self, short_code: &str) -> Result<u64> {
        tracing::debug!("GET {}", self.stats_url(short_code));

        let response = self
            .client
            .get(self.stats_url(short_code))
            .send()
            .await
            .map_err(|e| Error::network(format!("stats request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::response_error("stats", response).await);
        }

        let wire: WireStats = response
            .json()
            .await
            .map_err(|e| Error::network(format!("stats: invalid response body: {}", e)))?;
        Ok(wire.access_count)
    }

    fn redirect_url(&self, short_code: &str) -> String {
        format!("{}/shorten/r/{}", self.base_url, short_code)
    }
}
