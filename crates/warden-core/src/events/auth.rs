//! Authentication and session lifecycle events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events raised by the authentication command handlers.
///
/// Raw secrets never appear in an event; sessions are referred to by the
/// refresh token entity id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AuthEvent {
    /// A new account was registered and activated.
    UserRegistered {
        /// The user ID.
        user_id: Uuid,
        /// The registered email.
        email: String,
    },
    /// A user logged in and a session was created.
    UserLoggedIn {
        /// The user ID.
        user_id: Uuid,
        /// The new session (refresh token) ID.
        session_id: Uuid,
        /// Client IP, if known.
        ip_address: Option<String>,
        /// Client user agent, if known.
        user_agent: Option<String>,
    },
    /// A login attempt failed the password check.
    LoginFailed {
        /// The user ID, when the email matched an account.
        user_id: Option<Uuid>,
        /// The submitted (normalised) email.
        email: String,
        /// Consecutive failures recorded for this identifier.
        attempt_count: u32,
        /// Client IP, if known.
        ip_address: Option<String>,
    },
    /// A user logged out of one or all sessions.
    UserLoggedOut {
        /// The user ID.
        user_id: Uuid,
        /// The access token ID that was blacklisted.
        token_id: String,
        /// Whether every session was revoked.
        all_sessions: bool,
    },
    /// A refresh token was exchanged for a new pair.
    RefreshTokenRotated {
        /// The user ID.
        user_id: Uuid,
        /// The revoked session ID.
        old_session_id: Uuid,
        /// The replacement session ID.
        new_session_id: Uuid,
    },
    /// A password reset token was issued.
    PasswordResetRequested {
        /// The user ID.
        user_id: Uuid,
        /// The account email.
        email: String,
    },
    /// A password was reset with a reset token.
    PasswordReset {
        /// The user ID.
        user_id: Uuid,
        /// Sessions revoked as part of the reset.
        revoked_sessions: u64,
    },
    /// A single session was revoked through session management.
    SessionRevoked {
        /// The user ID.
        user_id: Uuid,
        /// The revoked session ID.
        session_id: Uuid,
    },
}

impl AuthEvent {
    /// Short event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserRegistered { .. } => "UserRegistered",
            Self::UserLoggedIn { .. } => "UserLoggedIn",
            Self::LoginFailed { .. } => "LoginFailed",
            Self::UserLoggedOut { .. } => "UserLoggedOut",
            Self::RefreshTokenRotated { .. } => "RefreshTokenRotated",
            Self::PasswordResetRequested { .. } => "PasswordResetRequested",
            Self::PasswordReset { .. } => "PasswordReset",
            Self::SessionRevoked { .. } => "SessionRevoked",
        }
    }

    /// The user the event concerns, if any.
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Self::UserRegistered { user_id, .. }
            | Self::UserLoggedIn { user_id, .. }
            | Self::UserLoggedOut { user_id, .. }
            | Self::RefreshTokenRotated { user_id, .. }
            | Self::PasswordResetRequested { user_id, .. }
            | Self::PasswordReset { user_id, .. }
            | Self::SessionRevoked { user_id, .. } => Some(*user_id),
            Self::LoginFailed { user_id, .. } => *user_id,
        }
    }
}
