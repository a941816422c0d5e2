use serde::Deserialize;
use std::time::Duration;

/// Default root of the remote site
pub const DEFAULT_BASE_URL: &str = "https://www.trendhunter.com/";

/// Main configuration structure for Trend-Harvest
///
/// Every section is optional; a missing file section falls back to the
/// same defaults the command line uses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub harvest: HarvestSettings,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Remote site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root URL that listing, seed and article paths are joined against
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,
}

/// Harvest sizing and discovery limits
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestSettings {
    /// Number of unique articles to hydrate per run
    #[serde(default = "default_count")]
    pub count: usize,

    /// Number of articles hydrated together and yielded as one batch
    #[serde(rename = "chunk-size", default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Maximum number of discovery rounds before the run is aborted
    #[serde(rename = "fail-safe-limit", default = "default_fail_safe_limit")]
    pub fail_safe_limit: usize,

    /// Ask listing-type pagination for the "best" sort order
    #[serde(default)]
    pub best: bool,
}

/// Transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Maximum number of requests in flight across the whole run
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// HTTP proxy for the primary transport
    #[serde(default)]
    pub proxy: Option<String>,

    /// Token refill rate (requests per second); enables rate limiting
    #[serde(default)]
    pub rate: Option<f64>,

    /// Token bucket capacity; defaults to the rate rounded up
    #[serde(default)]
    pub burst: Option<f64>,

    /// User agent sent by the primary transport
    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,
}

impl HttpConfig {
    /// Returns the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the (capacity, rate) pair for the token bucket, if rate limiting is enabled
    pub fn bucket(&self) -> Option<(f64, f64)> {
        self.rate.map(|rate| {
            let capacity = self.burst.unwrap_or_else(|| rate.ceil().max(1.0));
            (capacity, rate)
        })
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_count() -> usize {
    50
}

fn default_chunk_size() -> usize {
    100
}

fn default_fail_safe_limit() -> usize {
    1000
}

fn default_concurrency() -> usize {
    5
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            count: default_count(),
            chunk_size: default_chunk_size(),
            fail_safe_limit: default_fail_safe_limit(),
            best: false,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
            proxy: None,
            rate: None,
            burst: None,
            user_agent: None,
        }
    }
}
