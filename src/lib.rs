//! Trend-Harvest: a paginated listing harvester
//!
//! This crate walks the paginated listing API of a TrendHunter-style content site,
//! deduplicates the article links it discovers and hydrates each one into a
//! [`ContentRecord`], handing results to the caller in bounded batches.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Trend-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("No content retrieved from {url}")]
    SentinelEmpty { url: String },

    #[error("The metadata was not parsed from {url}")]
    SeedMetadata { url: String },

    #[error(
        "Unable to collect the requested links after {iterations} listing rounds; \
         fail-safe activated"
    )]
    FailSafeExceeded { iterations: usize },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::HarvestPhase,
        to: state::HarvestPhase,
    },
}

impl HarvestError {
    /// Returns true for the failures the fetcher treats as a missing resource
    /// (and therefore hands to the fallback transport)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::HttpStatus { .. } | Self::SentinelEmpty { .. }
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Trend-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{load_config, Config};
pub use crawler::{
    harvest, ContentRecord, Deduplicator, Extractor, FailurePolicy, FetchOutcome, Harvester,
    LinkPair, Metadata, PageType, SelectorExtractor,
};
pub use state::HarvestPhase;
pub use url::{canonical_link, slugify};
