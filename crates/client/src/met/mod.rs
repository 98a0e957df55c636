//! Collection API client.
//!
//! Talks to The Met Collection API with a per-request timeout, a small fixed
//! retry budget, and client-side pacing.
//!
//! ### Specification
//!
//! - **Endpoints**:
//!   - `GET /objects?departmentIds={id}&hasImages=true` -> `{objectIDs: [int]}`
//!   - `GET /objects/{id}` -> object document, or 404
//!   - `GET /search?q={term}&hasImages=true` -> `{objectIDs: [int]}`
//! - **Authentication**: none.
//! - **Retries**: up to `retries` extra attempts, `retry_delay` apart, on
//!   network or timeout failure only. HTTP statuses and malformed bodies are
//!   returned as errors immediately.
//! - **Rate Limiting**: requests are spaced at least `min_interval` apart to
//!   stay under the upstream's published limit of 80 requests per second.

pub mod error;
pub mod response;

pub use error::MetError;
pub use response::ObjectIdsResponse;

use async_trait::async_trait;
use curio_core::{AppConfig, ArtifactRecord, ObjectId};
use reqwest::{StatusCode, header};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::Collection;

/// Default base URL for the collection API.
const DEFAULT_BASE_URL: &str = "https://collectionapi.metmuseum.org/public/collection/v1";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Default delay between retry attempts.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "curio/0.1";

/// Minimum interval between requests (80 requests per second).
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(13);

/// Collection API client configuration.
#[derive(Debug, Clone)]
pub struct MetConfig {
    /// Base URL (default: https://collectionapi.metmuseum.org/public/collection/v1).
    pub base_url: String,
    /// Per-request timeout (default: 8s).
    pub timeout: Duration,
    /// Extra attempts after a transient failure (default: 2).
    pub retries: u32,
    /// Fixed delay between attempts (default: 200ms).
    pub retry_delay: Duration,
    /// Minimum spacing between requests (default: 13ms).
    pub min_interval: Duration,
    /// User-agent string (default: curio/0.x).
    pub user_agent: String,
}

impl Default for MetConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retries: 2,
            retry_delay: DEFAULT_RETRY_DELAY,
            min_interval: MIN_REQUEST_INTERVAL,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl From<&AppConfig> for MetConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
            retries: config.retries,
            retry_delay: config.retry_delay(),
            user_agent: config.user_agent.clone(),
            ..Default::default()
        }
    }
}

/// Rate limiter to enforce request intervals.
#[derive(Debug)]
struct RateLimiter {
    last_request: Mutex<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(Instant::now().checked_sub(min_interval).unwrap_or_else(Instant::now)),
            min_interval,
        }
    }

    /// Acquire permission to make a request, waiting if necessary.
    async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < self.min_interval {
            tokio::time::sleep(self.min_interval - elapsed).await;
        }
        *last = Instant::now();
    }
}

/// Collection API client.
#[derive(Debug, Clone)]
pub struct MetClient {
    http: reqwest::Client,
    config: MetConfig,
    rate_limiter: Arc<RateLimiter>,
}

impl MetClient {
    /// Create a new client with the given configuration.
    pub fn new(config: MetConfig) -> Result<Self, MetError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| MetError::Network(Arc::new(e)))?;

        let rate_limiter = Arc::new(RateLimiter::new(config.min_interval));
        Ok(Self { http, config, rate_limiter })
    }

    /// GET `path` and decode the JSON body, retrying transient failures.
    ///
    /// A 404 yields `Ok(None)`.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<Option<T>, MetError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let mut retries_left = self.config.retries;

        loop {
            match self.get_once(&url, query).await {
                Err(e) if e.is_transient() && retries_left > 0 => {
                    retries_left -= 1;
                    tracing::debug!(%url, error = %e, retries_left, "transient upstream failure, retrying");
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                result => return result,
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<Option<T>, MetError> {
        self.rate_limiter.acquire().await;

        let start = Instant::now();
        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        tracing::trace!(url, %status, elapsed = ?start.elapsed(), "upstream response");

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            return Err(MetError::HttpError { status: status.as_u16() });
        }

        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes).map_err(|e| MetError::Parse(e.to_string()))?;
        Ok(Some(body))
    }
}

#[async_trait]
impl Collection for MetClient {
    async fn list_by_bucket(&self, bucket_id: u32) -> Result<Vec<ObjectId>, MetError> {
        let bucket = bucket_id.to_string();
        let response: Option<ObjectIdsResponse> = self
            .get_json("/objects", &[("departmentIds", &bucket), ("hasImages", "true")])
            .await?;
        Ok(response.map(ObjectIdsResponse::into_ids).unwrap_or_default())
    }

    async fn search(&self, query: &str) -> Result<Vec<ObjectId>, MetError> {
        let response: Option<ObjectIdsResponse> =
            self.get_json("/search", &[("q", query), ("hasImages", "true")]).await?;
        Ok(response.map(ObjectIdsResponse::into_ids).unwrap_or_default())
    }

    async fn fetch_one(&self, id: ObjectId) -> Result<Option<ArtifactRecord>, MetError> {
        self.get_json(&format!("/objects/{id}"), &[]).await
    }
}
