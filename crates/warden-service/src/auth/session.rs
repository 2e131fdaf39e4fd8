//! Session listing and revocation.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::events::AuthEvent;
use warden_core::result::AppResult;
use warden_entity::token::SessionInfo;

use super::commands::RevokeSessionCommand;
use super::deps::AuthDeps;

/// Lists a user's active sessions.
#[derive(Debug, Clone)]
pub struct ListSessionsHandler {
    deps: Arc<AuthDeps>,
}

impl ListSessionsHandler {
    /// Create a new handler.
    pub fn new(deps: Arc<AuthDeps>) -> Self {
        Self { deps }
    }

    /// Active sessions, newest first. Secrets are never included.
    pub async fn handle(&self, user_id: Uuid) -> AppResult<Vec<SessionInfo>> {
        let sessions = self.deps.refresh_tokens.list_active(user_id).await?;
        Ok(sessions.iter().map(SessionInfo::from).collect())
    }
}

/// Revokes one of the caller's sessions.
#[derive(Debug, Clone)]
pub struct RevokeSessionHandler {
    deps: Arc<AuthDeps>,
}

impl RevokeSessionHandler {
    /// Create a new handler.
    pub fn new(deps: Arc<AuthDeps>) -> Self {
        Self { deps }
    }

    /// Revoke a session owned by the caller.
    ///
    /// Sessions that do not exist and sessions owned by someone else yield
    /// the same `NotFound`. Revoking an already revoked session succeeds.
    pub async fn handle(&self, cmd: RevokeSessionCommand) -> AppResult<()> {
        let session = self
            .deps
            .refresh_tokens
            .find(cmd.session_id)
            .await?
            .filter(|s| s.user_id == cmd.user_id)
            .ok_or_else(|| AppError::not_found("Session not found"))?;

        if session.revoked {
            return Ok(());
        }

        if self.deps.refresh_tokens.revoke(session.id).await? {
            info!(user_id = %cmd.user_id, session_id = %session.id, "Session revoked");
            self.deps
                .events
                .publish(AuthEvent::SessionRevoked {
                    user_id: cmd.user_id,
                    session_id: session.id,
                })
                .await;
        }
        Ok(())
    }
}
