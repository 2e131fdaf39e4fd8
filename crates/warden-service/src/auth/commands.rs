//! Explicit command structs accepted by the handlers.

use serde::Deserialize;
use uuid::Uuid;

/// Create an account and start a session.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterCommand {
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Display name.
    pub full_name: String,
    /// Client IP.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
}

/// Exchange credentials for a session.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginCommand {
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Client IP.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
}

/// Exchange a refresh token for a new token pair.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenCommand {
    /// Raw refresh token.
    pub refresh_token: String,
    /// Client IP.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
}

/// End the current access token, and optionally sessions.
#[derive(Debug, Clone)]
pub struct LogoutCommand {
    /// Authenticated user.
    pub user_id: Uuid,
    /// `jti` of the access token used for the request.
    pub token_id: String,
    /// Expiry of that access token (unix seconds).
    pub token_expires_at: i64,
    /// Revoke every session of the user.
    pub logout_all: bool,
    /// Refresh token of the current session, revoked when present.
    pub refresh_token: Option<String>,
}

/// Request a password reset token.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordCommand {
    /// Account email.
    pub email: String,
}

/// Redeem a reset token for a new password.
#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordCommand {
    /// Raw reset token.
    pub reset_token: String,
    /// New plaintext password.
    pub new_password: String,
}

/// Revoke one of the caller's own sessions.
#[derive(Debug, Clone)]
pub struct RevokeSessionCommand {
    /// Authenticated user.
    pub user_id: Uuid,
    /// Session to revoke.
    pub session_id: Uuid,
}
