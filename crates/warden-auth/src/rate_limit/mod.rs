//! Per-key token bucket rate limiting.

pub mod limiter;

pub use limiter::RateLimiter;
