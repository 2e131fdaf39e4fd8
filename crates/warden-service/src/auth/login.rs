//! Login handler.

use std::sync::Arc;

use tracing::{info, warn};

use warden_core::error::AppError;
use warden_core::events::AuthEvent;
use warden_core::result::AppResult;
use warden_entity::token::AuthResponse;
use warden_entity::user::model::normalize_email;

use super::commands::LoginCommand;
use super::deps::{AuthDeps, auth_response};

/// Authenticates credentials under lockout protection.
#[derive(Debug, Clone)]
pub struct LoginHandler {
    deps: Arc<AuthDeps>,
}

impl LoginHandler {
    /// Create a new handler.
    pub fn new(deps: Arc<AuthDeps>) -> Self {
        Self { deps }
    }

    /// Check lockout, verify the password, and start a session.
    ///
    /// Unknown emails and wrong passwords produce the same error and both
    /// count towards the lockout of the submitted email.
    pub async fn handle(&self, cmd: LoginCommand) -> AppResult<AuthResponse> {
        let email = normalize_email(&cmd.email);

        match self.deps.lockout.is_locked(&email).await {
            Ok((true, remaining)) => return Err(AppError::account_locked(remaining)),
            Ok((false, _)) => {}
            Err(e) => warn!(error = %e, "Lockout check failed; continuing"),
        }

        let Some(user) = self.deps.users.find_by_email(&email).await? else {
            let attempt_count = self.record_failure(&email).await;
            self.deps
                .events
                .publish(AuthEvent::LoginFailed {
                    user_id: None,
                    email,
                    attempt_count,
                    ip_address: cmd.ip_address,
                })
                .await;
            return Err(AppError::invalid_credentials());
        };

        if !user.is_active() {
            return Err(AppError::account_inactive("Account is not active"));
        }

        if !self
            .deps
            .hasher
            .verify_password(&cmd.password, &user.password_hash)
            .await?
        {
            let attempt_count = self.record_failure(&email).await;
            warn!(user_id = %user.id, attempt_count, "Failed login attempt");
            self.deps
                .events
                .publish(AuthEvent::LoginFailed {
                    user_id: Some(user.id),
                    email,
                    attempt_count,
                    ip_address: cmd.ip_address,
                })
                .await;
            return Err(AppError::invalid_credentials());
        }

        if let Err(e) = self.deps.lockout.reset_attempts(&email).await {
            warn!(error = %e, "Failed to reset lockout attempts");
        }

        let access = self.deps.rbac.resolve(&user.role_ids).await;
        let access_token = self.deps.access_token(&user, &access)?;
        let refresh = self
            .deps
            .refresh_tokens
            .issue(user.id, cmd.user_agent.clone(), cmd.ip_address.clone())
            .await?;

        info!(user_id = %user.id, session_id = %refresh.token.id, "User logged in");
        self.deps
            .events
            .publish(AuthEvent::UserLoggedIn {
                user_id: user.id,
                session_id: refresh.token.id,
                ip_address: cmd.ip_address,
                user_agent: cmd.user_agent,
            })
            .await;

        Ok(auth_response(&user, access, access_token, refresh))
    }

    async fn record_failure(&self, email: &str) -> u32 {
        match self.deps.lockout.record_failed_attempt(email).await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "Failed to record login failure");
                0
            }
        }
    }
}
