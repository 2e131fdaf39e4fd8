//! Values returned to callers of the command handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserProfile;

use super::refresh::RefreshToken;

/// Token pair plus the authenticated profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Signed access token.
    pub access_token: String,
    /// Raw refresh token. Shown once; only its hash is stored.
    pub refresh_token: String,
    /// Always `"Bearer"`.
    pub token_type: String,
    /// Access token expiry.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiry.
    pub refresh_expires_at: DateTime<Utc>,
    /// Session (refresh token) ID.
    pub session_id: Uuid,
    /// The authenticated user.
    pub user: UserProfile,
}

/// Raw reset token handed to the out-of-band delivery channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForgotPasswordResult {
    /// Account email.
    pub email: String,
    /// Raw reset token.
    pub reset_token: String,
    /// When the token stops working.
    pub expires_at: DateTime<Utc>,
}

/// An active session as listed by session management.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Session ID.
    pub id: Uuid,
    /// Client device description.
    pub device_info: Option<String>,
    /// Client IP.
    pub ip_address: Option<String>,
    /// When the session started (or was last rotated).
    pub created_at: DateTime<Utc>,
    /// When the session's refresh token expires.
    pub expires_at: DateTime<Utc>,
}

impl From<&RefreshToken> for SessionInfo {
    fn from(token: &RefreshToken) -> Self {
        Self {
            id: token.id,
            device_info: token.device_info.clone(),
            ip_address: token.ip_address.clone(),
            created_at: token.created_at,
            expires_at: token.expires_at,
        }
    }
}
