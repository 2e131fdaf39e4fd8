//! Revoked access token registry.

use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use warden_cache::CacheManager;
use warden_cache::keys;
use warden_core::result::AppResult;
use warden_core::traits::cache::CacheProvider;

/// Maps access token IDs to "revoked" until the token would have expired anyway.
#[derive(Debug, Clone)]
pub struct TokenBlacklist {
    cache: CacheManager,
}

impl TokenBlacklist {
    /// Create a blacklist over the given cache.
    pub fn new(cache: CacheManager) -> Self {
        Self { cache }
    }

    /// Blacklist `jti` until `expires_at_unix`. Already expired tokens are skipped.
    pub async fn add(&self, jti: &str, expires_at_unix: i64) -> AppResult<()> {
        let remaining_ms = expires_at_unix.saturating_mul(1000) - Utc::now().timestamp_millis();
        if remaining_ms <= 0 {
            debug!(jti, "Token already expired; not blacklisting");
            return Ok(());
        }

        self.cache
            .set(
                &keys::blacklist(jti),
                "revoked",
                Duration::from_millis(remaining_ms as u64),
            )
            .await?;
        debug!(jti, ttl_ms = remaining_ms, "Access token blacklisted");
        Ok(())
    }

    /// Whether `jti` was blacklisted and has not yet expired.
    pub async fn is_blacklisted(&self, jti: &str) -> AppResult<bool> {
        self.cache.exists(&keys::blacklist(jti)).await
    }
}
