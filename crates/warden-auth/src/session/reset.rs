//! Password reset tokens kept in the cache.
//!
//! Two entries per pending reset: `hash -> {email, expires_at}` for
//! redemption and `email -> hash` so a new request replaces the previous
//! token. Both carry the reset TTL. Redemption removes the token entry in one
//! atomic step, so a token is claimed by at most one caller.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use warden_cache::CacheManager;
use warden_cache::keys;
use warden_core::config::AuthConfig;
use warden_core::result::AppResult;
use warden_core::traits::cache::CacheProvider;

use crate::token::{generate_opaque_token, hash_opaque_token};

/// A freshly issued reset token.
#[derive(Debug, Clone)]
pub struct IssuedResetToken {
    /// Raw token for out-of-band delivery.
    pub raw: String,
    /// When it stops working.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PendingReset {
    email: String,
    expires_at: DateTime<Utc>,
}

/// A reset token taken out of the store by [`PasswordResetStore::claim`].
#[derive(Debug, Clone)]
pub struct ClaimedReset {
    /// Account the token was issued for.
    pub email: String,
    token_hash: String,
    expires_at: DateTime<Utc>,
}

/// Single-use, time-limited reset tokens keyed by hash.
#[derive(Debug, Clone)]
pub struct PasswordResetStore {
    cache: CacheManager,
    ttl: Duration,
}

impl PasswordResetStore {
    /// Create a store from configuration.
    pub fn new(cache: CacheManager, config: &AuthConfig) -> Self {
        Self {
            cache,
            ttl: Duration::from_secs(config.reset_token_ttl_minutes.saturating_mul(60)),
        }
    }

    /// Issue a reset token for `email`, replacing any pending one.
    pub async fn issue(&self, email: &str) -> AppResult<IssuedResetToken> {
        let email_key = keys::password_reset_email(email);
        if let Some(previous) = self.cache.get(&email_key).await? {
            self.cache.delete(&keys::password_reset(&previous)).await?;
            debug!("Replaced pending password reset token");
        }

        let raw = generate_opaque_token();
        let hash = hash_opaque_token(&raw);
        let expires_at = Utc::now()
            + chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::zero());
        let pending = PendingReset {
            email: email.to_string(),
            expires_at,
        };
        self.cache
            .set_json(&keys::password_reset(&hash), &pending, self.ttl)
            .await?;
        self.cache.set(&email_key, &hash, self.ttl).await?;

        Ok(IssuedResetToken { raw, expires_at })
    }

    /// The email a presented raw token belongs to, if it is still pending.
    pub async fn find_email(&self, raw: &str) -> AppResult<Option<String>> {
        let pending: Option<PendingReset> = self
            .cache
            .get_json(&keys::password_reset(&hash_opaque_token(raw)))
            .await?;
        Ok(pending.map(|p| p.email))
    }

    /// Hash of the pending token for `email`, if any.
    pub async fn pending_hash(&self, email: &str) -> AppResult<Option<String>> {
        self.cache.get(&keys::password_reset_email(email)).await
    }

    /// Atomically take a pending token out of the store.
    ///
    /// Returns `None` when the token is unknown, expired, or already claimed.
    pub async fn claim(&self, raw: &str) -> AppResult<Option<ClaimedReset>> {
        let hash = hash_opaque_token(raw);
        let pending: Option<PendingReset> =
            self.cache.take_json(&keys::password_reset(&hash)).await?;
        let Some(pending) = pending.filter(|p| p.expires_at > Utc::now()) else {
            return Ok(None);
        };

        let email_key = keys::password_reset_email(&pending.email);
        if self.cache.get(&email_key).await?.as_deref() == Some(hash.as_str()) {
            self.cache.delete(&email_key).await?;
        }

        Ok(Some(ClaimedReset {
            email: pending.email,
            token_hash: hash,
            expires_at: pending.expires_at,
        }))
    }

    /// Put a claimed token back after the reset could not be completed.
    ///
    /// Nothing is restored once the token has expired or a newer token has
    /// been issued for the same email.
    pub async fn restore(&self, claimed: &ClaimedReset) -> AppResult<bool> {
        let Ok(remaining) = (claimed.expires_at - Utc::now()).to_std() else {
            return Ok(false);
        };
        if remaining.is_zero() {
            return Ok(false);
        }

        let email_key = keys::password_reset_email(&claimed.email);
        if self.cache.exists(&email_key).await? {
            return Ok(false);
        }

        let pending = PendingReset {
            email: claimed.email.clone(),
            expires_at: claimed.expires_at,
        };
        self.cache
            .set_json(&keys::password_reset(&claimed.token_hash), &pending, remaining)
            .await?;
        self.cache
            .set(&email_key, &claimed.token_hash, remaining)
            .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> PasswordResetStore {
        PasswordResetStore::new(CacheManager::in_memory(), &AuthConfig::default())
    }

    #[tokio::test]
    async fn test_issue_and_redeem_once() {
        let store = store();
        let issued = store.issue("a@example.com").await.unwrap();

        assert_eq!(
            store.find_email(&issued.raw).await.unwrap().as_deref(),
            Some("a@example.com")
        );
        assert_eq!(
            store.pending_hash("a@example.com").await.unwrap(),
            Some(hash_opaque_token(&issued.raw))
        );

        let claimed = store.claim(&issued.raw).await.unwrap().unwrap();
        assert_eq!(claimed.email, "a@example.com");
        assert!(store.find_email(&issued.raw).await.unwrap().is_none());
        assert!(store.pending_hash("a@example.com").await.unwrap().is_none());
        assert!(store.claim(&issued.raw).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_claims_have_one_winner() {
        let store = store();
        let issued = store.issue("a@example.com").await.unwrap();

        let (a, b) = tokio::join!(store.claim(&issued.raw), store.claim(&issued.raw));
        let winners = [a.unwrap(), b.unwrap()]
            .into_iter()
            .filter(Option::is_some)
            .count();
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_restore_makes_token_redeemable_again() {
        let store = store();
        let issued = store.issue("a@example.com").await.unwrap();
        let claimed = store.claim(&issued.raw).await.unwrap().unwrap();

        assert!(store.restore(&claimed).await.unwrap());
        assert_eq!(
            store.find_email(&issued.raw).await.unwrap().as_deref(),
            Some("a@example.com")
        );
        assert_eq!(
            store.pending_hash("a@example.com").await.unwrap(),
            Some(hash_opaque_token(&issued.raw))
        );
    }

    #[tokio::test]
    async fn test_restore_skipped_when_newer_token_issued() {
        let store = store();
        let first = store.issue("a@example.com").await.unwrap();
        let claimed = store.claim(&first.raw).await.unwrap().unwrap();
        let second = store.issue("a@example.com").await.unwrap();

        assert!(!store.restore(&claimed).await.unwrap());
        assert!(store.find_email(&first.raw).await.unwrap().is_none());
        assert!(store.find_email(&second.raw).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_new_request_replaces_previous_token() {
        let store = store();
        let first = store.issue("a@example.com").await.unwrap();
        let second = store.issue("a@example.com").await.unwrap();

        assert!(store.find_email(&first.raw).await.unwrap().is_none());
        assert!(store.find_email(&second.raw).await.unwrap().is_some());
        assert_eq!(
            store.pending_hash("a@example.com").await.unwrap(),
            Some(hash_opaque_token(&second.raw))
        );
    }

    #[tokio::test]
    async fn test_raw_token_is_not_a_key() {
        let cache = CacheManager::in_memory();
        let store = PasswordResetStore::new(cache.clone(), &AuthConfig::default());
        let issued = store.issue("a@example.com").await.unwrap();
        assert!(!cache.exists(&keys::password_reset(&issued.raw)).await.unwrap());
    }
}
