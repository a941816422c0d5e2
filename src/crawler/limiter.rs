//! Token-bucket rate limiter shared by every fetch of a harvest
//!
//! The bucket starts full. Each acquisition refills it according to the time
//! elapsed since the last refill, then takes one token, waiting for the
//! shortfall to accrue if the bucket is empty. Tokens are never returned.

use crate::ConfigError;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Shortest suspension used while waiting for a token
const MIN_WAIT: Duration = Duration::from_millis(1);

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl Bucket {
    fn refill(&mut self, capacity: f64, rate: f64, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * rate).min(capacity);
        self.last_refill = now;
    }
}

/// Proof that a token was taken from the bucket
///
/// Dropping the permit does not give the token back.
#[derive(Debug)]
#[must_use]
pub struct RatePermit {
    _private: (),
}

/// Token-bucket admission control
#[derive(Debug)]
pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    capacity: f64,
    rate: f64,
}

impl RateLimiter {
    /// Creates a limiter with burst `capacity` refilled at `rate` tokens per second
    ///
    /// # Returns
    ///
    /// * `Ok(RateLimiter)` - A full bucket
    /// * `Err(ConfigError)` - Capacity is below one token, or rate is not a positive, finite number
    pub fn new(capacity: f64, rate: f64) -> Result<Self, ConfigError> {
        // A bucket smaller than one token could never be acquired from
        if !capacity.is_finite() || capacity < 1.0 {
            return Err(ConfigError::Validation(format!(
                "rate limiter capacity must be at least 1, got {}",
                capacity
            )));
        }

        if !rate.is_finite() || rate <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "rate limiter rate must be positive, got {}",
                rate
            )));
        }

        Ok(Self {
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
            capacity,
            rate,
        })
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Waits until a token is available and takes it
    ///
    /// The bucket lock is held across the wait, so concurrent callers are
    /// served one at a time and a woken caller cannot lose its token to another.
    pub async fn acquire(&self) -> RatePermit {
        let mut bucket = self.bucket.lock().await;

        loop {
            bucket.refill(self.capacity, self.rate, Instant::now());

            if bucket.tokens >= 1.0 {
                bucket.tokens -= 1.0;
                return RatePermit { _private: () };
            }

            let shortfall = 1.0 - bucket.tokens;
            let wait = Duration::from_secs_f64(shortfall / self.rate).max(MIN_WAIT);
            tracing::trace!("Rate limiter empty, waiting {:?}", wait);
            sleep(wait).await;
        }
    }

    /// Returns the number of tokens currently available, after refilling
    #[cfg(test)]
    pub async fn available(&self) -> f64 {
        let mut bucket = self.bucket.lock().await;
        bucket.refill(self.capacity, self.rate, Instant::now());
        bucket.tokens
    }
}
