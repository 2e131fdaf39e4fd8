//! Cache key builders for all Warden cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

/// Cache key marking a revoked access token by its `jti`.
pub fn blacklist(jti: &str) -> String {
    format!("blacklist:{jti}")
}

/// Cache key mapping a reset token hash to the account email.
pub fn password_reset(token_hash: &str) -> String {
    format!("reset:token:{token_hash}")
}

/// Cache key holding the live reset token hash for an email.
pub fn password_reset_email(email: &str) -> String {
    format!("reset:email:{email}")
}

/// Cache key for the failed-login state of an identifier.
pub fn lockout(identifier: &str) -> String {
    format!("lockout:{identifier}")
}
