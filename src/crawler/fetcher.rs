//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building the primary client (proxy, timeout, no redirects)
//! - Building the fallback client (library defaults)
//! - Detecting the listing API's "empty success" payload
//! - Applying the caller's failure policy

use crate::config::HttpConfig;
use crate::crawler::cursor::RequestDescriptor;
use crate::crawler::scheduler::Scheduler;
use crate::HarvestError;
use reqwest::{redirect::Policy, Client, Proxy, StatusCode};
use std::borrow::Cow;

/// Body the listing API returns, with a 200 status, when it has nothing to show
pub const EMPTY_SENTINEL: &[u8] = br#"{"success":true,"data":""}"#;

/// Raw payload of a fetched resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// URL the payload was requested from
    pub url: String,

    /// Response body
    pub body: Vec<u8>,
}

impl Resource {
    pub fn new(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }

    /// Returns the body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Result of a fetch that did not abort the run
#[derive(Debug)]
pub enum FetchOutcome {
    /// The resource was retrieved, by either transport
    Fetched(Resource),

    /// Both transports failed and the failure was logged
    Degraded {
        /// The URL that failed
        url: String,
        /// Description of the original failure
        error: String,
    },
}

impl FetchOutcome {
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched(_))
    }

    pub fn into_resource(self) -> Option<Resource> {
        match self {
            Self::Fetched(resource) => Some(resource),
            Self::Degraded { .. } => None,
        }
    }
}

/// What the fetcher does when both transports fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Return the original error to the caller
    Fatal,
    /// Log the error and return [`FetchOutcome::Degraded`]
    Degrade,
}

/// Builds the primary HTTP client
///
/// Redirects are not followed, so a redirect counts as a failed request and
/// is handed to the fallback client.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| format!("trend-harvest/{}", env!("CARGO_PKG_VERSION")));

    let mut builder = Client::builder()
        .user_agent(user_agent)
        .timeout(config.timeout())
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = &config.proxy {
        builder = builder.proxy(Proxy::all(proxy.as_str())?);
    }

    builder.build()
}

/// Builds the fallback HTTP client with library defaults
pub fn build_fallback_client() -> Result<Client, reqwest::Error> {
    Client::builder().build()
}

/// Returns true if the body contains the empty-success sentinel
pub fn is_empty_sentinel(body: &[u8]) -> bool {
    body.windows(EMPTY_SENTINEL.len())
        .any(|window| window == EMPTY_SENTINEL)
}

/// Fetches resources under the scheduler's concurrency and rate limits
#[derive(Clone)]
pub struct BoundedFetcher {
    client: Client,
    fallback: Client,
    scheduler: Scheduler,
}

impl BoundedFetcher {
    pub fn new(client: Client, fallback: Client, scheduler: Scheduler) -> Self {
        Self {
            client,
            fallback,
            scheduler,
        }
    }

    /// Builds both clients and the scheduler from transport configuration
    pub fn from_config(config: &HttpConfig) -> Result<Self, HarvestError> {
        Ok(Self::new(
            build_http_client(config)?,
            build_fallback_client()?,
            Scheduler::from_config(config)?,
        ))
    }

    /// Fetches a request descriptor under the given failure policy
    pub async fn fetch(
        &self,
        descriptor: &RequestDescriptor,
        policy: FailurePolicy,
    ) -> Result<FetchOutcome, HarvestError> {
        self.fetch_url(descriptor.as_str(), policy).await
    }

    /// Fetches a URL under the given failure policy
    ///
    /// # Request Flow
    ///
    /// 1. Wait for a concurrency slot and, if configured, a rate token
    /// 2. GET with the primary client; non-2xx is a failure
    /// 3. A body containing [`EMPTY_SENTINEL`] is a failure
    /// 4. On failure, one GET with the fallback client; HTTP 200 is a success
    /// 5. Otherwise apply `policy` to the primary client's error
    ///
    /// There are no retries beyond the single fallback attempt.
    pub async fn fetch_url(
        &self,
        url: &str,
        policy: FailurePolicy,
    ) -> Result<FetchOutcome, HarvestError> {
        match self.fetch_resource(url).await {
            Ok(resource) => Ok(FetchOutcome::Fetched(resource)),
            Err(e) if policy == FailurePolicy::Degrade && e.is_transport() => {
                tracing::error!("HTTP error downloading content of {}: {}", url, e);
                Ok(FetchOutcome::Degraded {
                    url: url.to_string(),
                    error: e.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Fetches a descriptor whose failure must abort the caller
    pub async fn fetch_required(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<Resource, HarvestError> {
        self.fetch_resource(descriptor.as_str()).await
    }

    async fn fetch_resource(&self, url: &str) -> Result<Resource, HarvestError> {
        let _admission = self.scheduler.admit().await;

        tracing::debug!("Downloading content from {}", url);

        let error = match self.fetch_primary(url).await {
            Ok(body) => return Ok(Resource::new(url, body)),
            Err(e) => e,
        };

        tracing::warn!("Primary request for {} failed ({}), trying fallback", url, error);

        match self.fetch_fallback(url).await {
            Some(body) => {
                tracing::info!("Fallback request for {} succeeded", url);
                Ok(Resource::new(url, body))
            }
            None => Err(error),
        }
    }

    async fn fetch_primary(&self, url: &str) -> Result<Vec<u8>, HarvestError> {
        let transport = |source: reqwest::Error| HarvestError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;

        // Redirects are not followed, so 3xx must be rejected here as well
        if !response.status().is_success() {
            return Err(HarvestError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;

        if is_empty_sentinel(&body) {
            return Err(HarvestError::SentinelEmpty {
                url: url.to_string(),
            });
        }

        Ok(body.to_vec())
    }

    async fn fetch_fallback(&self, url: &str) -> Option<Vec<u8>> {
        let response = match self.fallback.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Fallback request for {} failed: {}", url, e);
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            tracing::debug!(
                "Fallback request for {} returned HTTP {}",
                url,
                response.status().as_u16()
            );
            return None;
        }

        match response.bytes().await {
            Ok(body) => Some(body.to_vec()),
            Err(e) => {
                tracing::debug!("Fallback body for {} could not be read: {}", url, e);
                None
            }
        }
    }
}
