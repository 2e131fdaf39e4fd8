//! Token bucket limiter keyed by client (usually the remote IP).
//!
//! Buckets live in a sharded map so concurrent requests from different
//! clients never contend on one lock. Timing uses `tokio::time::Instant`,
//! which lets tests drive the clock with `tokio::time::pause`.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info};

use warden_core::config::RateLimitConfig;

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl Bucket {
    fn refill(&mut self, now: Instant, rate: f64, capacity: f64) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * rate).min(capacity);
        self.last_refill = now;
    }
}

/// Token bucket rate limiter.
#[derive(Debug)]
pub struct RateLimiter {
    buckets: DashMap<String, Bucket>,
    rate: f64,
    capacity: f64,
    idle_timeout: Duration,
}

impl RateLimiter {
    /// Create a limiter refilling `requests_per_second` up to `burst_size` tokens.
    pub fn new(requests_per_second: f64, burst_size: u32, idle_timeout: Duration) -> Self {
        Self {
            buckets: DashMap::new(),
            rate: requests_per_second,
            capacity: f64::from(burst_size),
            idle_timeout,
        }
    }

    /// Create a limiter from configuration.
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            config.requests_per_second,
            config.burst_size,
            Duration::from_secs(config.idle_timeout_seconds),
        )
    }

    /// Take one token for `key`. Returns `false` if none is available.
    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut bucket = self.buckets.entry(key.to_string()).or_insert(Bucket {
            tokens: self.capacity,
            last_refill: now,
        });
        bucket.refill(now, self.rate, self.capacity);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Time until `key` has a whole token again. Zero if one is available now.
    pub fn retry_after(&self, key: &str) -> Duration {
        let Some(bucket) = self.buckets.get(key) else {
            return Duration::ZERO;
        };
        let mut bucket = *bucket;
        bucket.refill(Instant::now(), self.rate, self.capacity);

        if bucket.tokens >= 1.0 {
            Duration::ZERO
        } else {
            // A bucket that never refills frees up once the sweep evicts it.
            Duration::try_from_secs_f64((1.0 - bucket.tokens) / self.rate)
                .unwrap_or(self.idle_timeout)
        }
    }

    /// Evict buckets idle for longer than the configured timeout.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_refill) < self.idle_timeout);
        before.saturating_sub(self.buckets.len())
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Sweep idle buckets every `interval` until the cancel signal is received.
    pub async fn run_cleanup(self: Arc<Self>, interval: Duration, mut cancel: watch::Receiver<bool>) {
        info!(
            interval_seconds = interval.as_secs(),
            "Rate limiter cleanup started"
        );
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let evicted = self.sweep();
                    if evicted > 0 {
                        debug!(evicted, remaining = self.len(), "Evicted idle rate limit buckets");
                    }
                }
            }
        }

        info!("Rate limiter cleanup stopped");
    }
}
