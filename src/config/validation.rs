use crate::config::types::{Config, HarvestSettings, HttpConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_harvest_settings(&config.harvest)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates the remote site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url '{}' must use HTTP or HTTPS",
            config.base_url
        )));
    }

    Ok(())
}

/// Validates harvest sizing
fn validate_harvest_settings(config: &HarvestSettings) -> Result<(), ConfigError> {
    if config.count < 1 {
        return Err(ConfigError::Validation(format!(
            "count must be >= 1, got {}",
            config.count
        )));
    }

    if config.chunk_size < 1 {
        return Err(ConfigError::Validation(format!(
            "chunk-size must be >= 1, got {}",
            config.chunk_size
        )));
    }

    if config.fail_safe_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "fail-safe-limit must be >= 1, got {}",
            config.fail_safe_limit
        )));
    }

    Ok(())
}

/// Validates transport configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if let Some(proxy) = &config.proxy {
        Url::parse(proxy)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy '{}': {}", proxy, e)))?;
    }

    validate_positive("rate", config.rate)?;
    validate_positive("burst", config.burst)?;

    if config.burst.is_some() && config.rate.is_none() {
        return Err(ConfigError::Validation(
            "burst requires rate to be set".to_string(),
        ));
    }

    Ok(())
}

/// Validates an optional strictly positive, finite value
fn validate_positive(name: &str, value: Option<f64>) -> Result<(), ConfigError> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => Err(ConfigError::Validation(format!(
            "{} must be a positive number, got {}",
            name, v
        ))),
        _ => Ok(()),
    }
}
