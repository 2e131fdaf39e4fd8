//! Refresh handler.

use std::sync::Arc;

use warden_core::error::AppError;
use warden_core::events::AuthEvent;
use warden_core::result::AppResult;
use warden_entity::token::AuthResponse;

use super::commands::RefreshTokenCommand;
use super::deps::{AuthDeps, auth_response};

/// Exchanges a refresh token for a fresh pair, rotating the session.
#[derive(Debug, Clone)]
pub struct RefreshTokenHandler {
    deps: Arc<AuthDeps>,
}

impl RefreshTokenHandler {
    /// Create a new handler.
    pub fn new(deps: Arc<AuthDeps>) -> Self {
        Self { deps }
    }

    /// Validate and rotate the presented token.
    ///
    /// Roles and permissions are resolved again so the new access token
    /// reflects the user's current grants.
    pub async fn handle(&self, cmd: RefreshTokenCommand) -> AppResult<AuthResponse> {
        let current = self
            .deps
            .refresh_tokens
            .validate(&cmd.refresh_token)
            .await?;

        let Some(user) = self.deps.users.find_by_id(current.user_id).await? else {
            return Err(AppError::invalid_refresh_token());
        };
        if !user.is_active() {
            return Err(AppError::account_inactive("Account is not active"));
        }

        let refresh = self
            .deps
            .refresh_tokens
            .rotate(&current, cmd.user_agent, cmd.ip_address)
            .await?;
        let access = self.deps.rbac.resolve(&user.role_ids).await;
        let access_token = self.deps.access_token(&user, &access)?;

        self.deps
            .events
            .publish(AuthEvent::RefreshTokenRotated {
                user_id: user.id,
                old_session_id: current.id,
                new_session_id: refresh.token.id,
            })
            .await;

        Ok(auth_response(&user, access, access_token, refresh))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use warden_core::error::AppError;

    use super::super::test_support::{TestContext, refresh_cmd, register_cmd};

    #[tokio::test]
    async fn test_refresh_rotates_and_old_token_dies() {
        let ctx = TestContext::new().await;
        let first = ctx.service.register(register_cmd("ivy@example.com")).await.unwrap();

        let second = ctx
            .service
            .refresh(refresh_cmd(&first.refresh_token))
            .await
            .unwrap();
        assert_ne!(second.refresh_token, first.refresh_token);
        assert_ne!(second.session_id, first.session_id);

        let err = ctx
            .service
            .refresh(refresh_cmd(&first.refresh_token))
            .await
            .unwrap_err();
        assert_eq!(err, AppError::invalid_refresh_token());

        ctx.service
            .refresh(refresh_cmd(&second.refresh_token))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unknown_token_rejected() {
        let ctx = TestContext::new().await;
        let err = ctx
            .service
            .refresh(refresh_cmd("not-a-real-token"))
            .await
            .unwrap_err();
        assert_eq!(err, AppError::invalid_refresh_token());
    }

    #[tokio::test]
    async fn test_concurrent_refresh_has_single_winner() {
        let ctx = TestContext::new().await;
        let first = ctx.service.register(register_cmd("jack@example.com")).await.unwrap();
        let service = Arc::new(ctx.service.clone());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = Arc::clone(&service);
            let raw = first.refresh_token.clone();
            handles.push(tokio::spawn(async move {
                service.refresh(refresh_cmd(&raw)).await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);

        let active = ctx
            .service
            .list_sessions(first.user.id)
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
    }
}
