//! Refresh token entity.
//!
//! Only the SHA-256 hash of the raw token is ever stored. A row is created in
//! the active state and afterwards only its `revoked` flag may change.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle state of a refresh token at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshTokenState {
    /// Not revoked and not expired.
    Active,
    /// Explicitly revoked (terminal).
    Revoked,
    /// Past `expires_at` (terminal).
    Expired,
}

/// A persisted refresh token, one per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    /// Session ID.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Hex SHA-256 of the raw token.
    #[serde(skip_serializing)]
    pub token_hash: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Whether the token was revoked.
    pub revoked: bool,
    /// When the token was revoked.
    pub revoked_at: Option<DateTime<Utc>>,
    /// Client user agent / device description.
    pub device_info: Option<String>,
    /// Client IP address.
    pub ip_address: Option<String>,
}

impl RefreshToken {
    /// Create a new active token row for the given hash.
    pub fn new(
        user_id: Uuid,
        token_hash: String,
        ttl: Duration,
        device_info: Option<String>,
        ip_address: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            expires_at: now + ttl,
            created_at: now,
            revoked: false,
            revoked_at: None,
            device_info,
            ip_address,
        }
    }

    /// State at `now`. Revocation wins over expiry.
    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.revoked {
            RefreshTokenState::Revoked
        } else if now >= self.expires_at {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Active
        }
    }

    /// Whether the token is usable right now.
    pub fn is_active(&self) -> bool {
        self.state_at(Utc::now()) == RefreshTokenState::Active
    }
}
