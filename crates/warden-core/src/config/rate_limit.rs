//! Request rate limiting configuration.

use serde::{Deserialize, Serialize};

/// Token-bucket rate limiting for the public authentication endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether the limiter is applied at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Continuous refill rate.
    #[serde(default = "default_rps")]
    pub requests_per_second: f64,
    /// Bucket capacity.
    #[serde(default = "default_burst")]
    pub burst_size: u32,
    /// Buckets untouched for longer than this are evicted, in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Interval of the background eviction sweep, in seconds.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: default_rps(),
            burst_size: default_burst(),
            idle_timeout_seconds: default_idle_timeout(),
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_rps() -> f64 {
    1.0
}

fn default_burst() -> u32 {
    10
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_cleanup_interval() -> u64 {
    60
}
