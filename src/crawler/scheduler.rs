//! Admission control for outgoing requests
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore shared by the whole run
//! - Optional token-bucket rate limiting on top of the concurrency ceiling

use crate::config::HttpConfig;
use crate::crawler::limiter::{RateLimiter, RatePermit};
use crate::ConfigError;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// A request slot granted by the scheduler
///
/// The concurrency permit is released when the admission is dropped.
pub struct Admission {
    _permit: OwnedSemaphorePermit,
    _rate: Option<RatePermit>,
}

/// Scheduler gates every fetch behind the concurrency ceiling and the rate limiter
#[derive(Clone)]
pub struct Scheduler {
    /// Global semaphore for limiting concurrent fetches
    global_semaphore: Arc<Semaphore>,

    /// Token bucket, when rate limiting is enabled
    limiter: Option<Arc<RateLimiter>>,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `concurrency` - Maximum number of requests in flight
    /// * `limiter` - Optional token bucket applied after a slot is granted
    pub fn new(concurrency: usize, limiter: Option<RateLimiter>) -> Self {
        Self {
            global_semaphore: Arc::new(Semaphore::new(concurrency)),
            limiter: limiter.map(Arc::new),
        }
    }

    /// Creates a scheduler from transport configuration
    pub fn from_config(config: &HttpConfig) -> Result<Self, ConfigError> {
        let limiter = config
            .bucket()
            .map(|(capacity, rate)| RateLimiter::new(capacity, rate))
            .transpose()?;

        if let Some(limiter) = &limiter {
            tracing::info!(
                "Rate limiting enabled: {} requests/sec, burst {}",
                limiter.rate(),
                limiter.capacity()
            );
        }

        Ok(Self::new(config.concurrency, limiter))
    }

    /// Waits for a concurrency slot, then for a rate token
    pub async fn admit(&self) -> Admission {
        // The semaphore is private and never closed, so acquisition cannot fail
        let permit = match self.global_semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => unreachable!("scheduler semaphore closed"),
        };

        let rate = match &self.limiter {
            Some(limiter) => Some(limiter.acquire().await),
            None => None,
        };

        Admission {
            _permit: permit,
            _rate: rate,
        }
    }

    /// Returns the number of concurrency slots currently free
    #[cfg(test)]
    pub fn available_permits(&self) -> usize {
        self.global_semaphore.available_permits()
    }

    /// Returns whether a rate limiter is configured
    #[cfg(test)]
    pub fn is_rate_limited(&self) -> bool {
        self.limiter.is_some()
    }
}
