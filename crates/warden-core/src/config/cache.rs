//! Cache provider configuration.

use serde::{Deserialize, Serialize};

/// Which cache provider backs the blacklist, reset tokens, and shared lockout counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// In-process moka cache.
    #[default]
    Memory,
    /// Redis, shared between instances.
    Redis,
}

/// Top-level cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache provider.
    #[serde(default)]
    pub provider: CacheBackend,
    /// Redis-specific settings.
    #[serde(default)]
    pub redis: RedisCacheConfig,
    /// In-memory settings.
    #[serde(default)]
    pub memory: MemoryCacheConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            provider: CacheBackend::default(),
            redis: RedisCacheConfig::default(),
            memory: MemoryCacheConfig::default(),
        }
    }
}

/// Redis cache backend configuration.
///
/// The server must run with `maxmemory-policy noeviction` (or at least never
/// evict the Warden prefix): an evicted blacklist or lockout key silently
/// re-admits a revoked token or unlocks an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisCacheConfig {
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Key prefix for all Warden cache keys.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

/// In-memory cache backend configuration.
///
/// There is no size bound: blacklist and lockout entries must survive until
/// their own TTL, so entries only leave on expiry or explicit deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryCacheConfig {
    /// Number of entries to pre-allocate room for.
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
        }
    }
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_key_prefix() -> String {
    "warden:".to_string()
}

fn default_initial_capacity() -> usize {
    1024
}
