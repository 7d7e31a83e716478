//! Admission gate in front of the upstream fetcher
//!
//! A single token bucket shared by every concurrent search. Rejections are
//! immediate: callers never queue for a permit.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::config::RateLimitConfig;

/// Permit accounting behind [`AdmissionGate`]
///
/// One token admits one search. An empty bucket reports how long until the
/// next permit so the rejection can be logged with a retry hint.
struct TokenBucket {
    /// Available tokens
    tokens: f64,
    /// Last refill time
    last_refill: Instant,
    /// Tokens per second
    rate: f64,
    /// Maximum burst size
    capacity: u32,
}

impl TokenBucket {
    fn new(rate: f64, capacity: u32) -> Self {
        Self {
            tokens: capacity as f64,
            last_refill: Instant::now(),
            rate,
            capacity,
        }
    }

    /// Take one permit; `Some(wait)` means the search is refused
    fn try_consume(&mut self) -> Option<Duration> {
        // Refill tokens based on time elapsed
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity as f64);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            None
        } else {
            let wait_secs = (1.0 - self.tokens) / self.rate;
            Some(Duration::try_from_secs_f64(wait_secs).unwrap_or(Duration::MAX))
        }
    }
}

/// Shared admission gate
///
/// Built from [`RateLimitConfig`]: `limit_for_period` permits, refilled at
/// `limit_for_period / refresh_period` per second. A disabled config admits
/// everything.
pub struct AdmissionGate {
    bucket: Option<Mutex<TokenBucket>>,
}

impl AdmissionGate {
    /// Create a gate from configuration
    pub fn new(config: &RateLimitConfig) -> Self {
        let bucket = if config.enabled {
            let rate =
                config.limit_for_period as f64 / config.refresh_period.as_secs_f64().max(f64::EPSILON);
            Some(Mutex::new(TokenBucket::new(rate, config.limit_for_period)))
        } else {
            None
        };
        Self { bucket }
    }

    /// A gate that admits every call
    pub fn unlimited() -> Self {
        Self { bucket: None }
    }

    /// Try to take one permit
    ///
    /// Returns `None` when admitted, otherwise the time until the next permit
    /// becomes available. The bucket is only touched under its lock, so
    /// concurrent callers never share a permit.
    pub async fn check(&self) -> Option<Duration> {
        let bucket = self.bucket.as_ref()?;
        bucket.lock().await.try_consume()
    }
}

impl std::fmt::Debug for AdmissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionGate")
            .field("enabled", &self.bucket.is_some())
            .finish()
    }
}
