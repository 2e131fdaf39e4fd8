//! Forgot-password and reset-password handlers.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::events::AuthEvent;
use warden_core::result::AppResult;
use warden_entity::token::ForgotPasswordResult;
use warden_entity::user::model::normalize_email;

use super::commands::{ForgotPasswordCommand, ResetPasswordCommand};
use super::deps::AuthDeps;

/// Issues password reset tokens.
#[derive(Debug, Clone)]
pub struct ForgotPasswordHandler {
    deps: Arc<AuthDeps>,
}

impl ForgotPasswordHandler {
    /// Create a new handler.
    pub fn new(deps: Arc<AuthDeps>) -> Self {
        Self { deps }
    }

    /// Issue a reset token for an active account.
    ///
    /// Returns `None` for unknown or inactive accounts. Callers must answer
    /// both outcomes identically to the client; the token is for out-of-band
    /// delivery only.
    pub async fn handle(&self, cmd: ForgotPasswordCommand) -> AppResult<Option<ForgotPasswordResult>> {
        let email = normalize_email(&cmd.email);

        let user = match self.deps.users.find_by_email(&email).await? {
            Some(user) if user.is_active() => user,
            _ => {
                debug!("Password reset requested for unknown or inactive account");
                return Ok(None);
            }
        };

        let issued = self.deps.reset_tokens.issue(&user.email).await?;

        info!(user_id = %user.id, "Password reset token issued");
        self.deps
            .events
            .publish(AuthEvent::PasswordResetRequested {
                user_id: user.id,
                email: user.email.clone(),
            })
            .await;

        Ok(Some(ForgotPasswordResult {
            email: user.email,
            reset_token: issued.raw,
            expires_at: issued.expires_at,
        }))
    }
}

/// Redeems reset tokens.
#[derive(Debug, Clone)]
pub struct ResetPasswordHandler {
    deps: Arc<AuthDeps>,
}

impl ResetPasswordHandler {
    /// Create a new handler.
    pub fn new(deps: Arc<AuthDeps>) -> Self {
        Self { deps }
    }

    /// Claim the token, revoke every session, then store the new password.
    ///
    /// The token is claimed atomically before any work, so concurrent
    /// redemptions of one token have a single winner. If a later step fails
    /// the token is put back and the password is left unchanged.
    pub async fn handle(&self, cmd: ResetPasswordCommand) -> AppResult<()> {
        self.deps.password_policy.validate(&cmd.new_password)?;

        let Some(claimed) = self.deps.reset_tokens.claim(&cmd.reset_token).await? else {
            return Err(AppError::invalid_reset_token());
        };

        let (user_id, revoked_sessions) =
            match self.apply(&claimed.email, &cmd.new_password).await {
                Ok(Some(done)) => done,
                Ok(None) => return Err(AppError::invalid_reset_token()),
                Err(e) => {
                    match self.deps.reset_tokens.restore(&claimed).await {
                        Ok(restored) => debug!(restored, "Password reset aborted"),
                        Err(restore_err) => {
                            warn!(error = %restore_err, "Failed to restore reset token")
                        }
                    }
                    return Err(e);
                }
            };

        if let Err(e) = self.deps.lockout.reset_attempts(&claimed.email).await {
            warn!(error = %e, "Failed to reset lockout attempts after password reset");
        }

        info!(user_id = %user_id, revoked_sessions, "Password reset");
        self.deps
            .events
            .publish(AuthEvent::PasswordReset {
                user_id,
                revoked_sessions,
            })
            .await;
        Ok(())
    }

    async fn apply(&self, email: &str, new_password: &str) -> AppResult<Option<(Uuid, u64)>> {
        let Some(mut user) = self.deps.users.find_by_email(email).await? else {
            return Ok(None);
        };

        let password_hash = self.deps.hasher.hash_password(new_password).await?;
        let revoked_sessions = self.deps.refresh_tokens.revoke_all(user.id).await?;

        user.change_password(password_hash);
        self.deps.users.update(&user).await?;
        Ok(Some((user.id, revoked_sessions)))
    }
}
