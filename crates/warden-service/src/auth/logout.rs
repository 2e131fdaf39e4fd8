//! Logout handler.

use std::sync::Arc;

use tracing::info;

use warden_core::events::AuthEvent;
use warden_core::result::AppResult;

use super::commands::LogoutCommand;
use super::deps::AuthDeps;

/// Blacklists the presented access token and ends sessions.
#[derive(Debug, Clone)]
pub struct LogoutHandler {
    deps: Arc<AuthDeps>,
}

impl LogoutHandler {
    /// Create a new handler.
    pub fn new(deps: Arc<AuthDeps>) -> Self {
        Self { deps }
    }

    /// Blacklist the access token, then revoke the current session or all of them.
    ///
    /// A refresh token belonging to another user is ignored.
    pub async fn handle(&self, cmd: LogoutCommand) -> AppResult<()> {
        self.deps
            .blacklist
            .add(&cmd.token_id, cmd.token_expires_at)
            .await?;

        if cmd.logout_all {
            let revoked = self.deps.refresh_tokens.revoke_all(cmd.user_id).await?;
            info!(user_id = %cmd.user_id, revoked, "Logged out of all sessions");
        } else {
            if let Some(raw) = cmd.refresh_token.as_deref() {
                let session = self.deps.refresh_tokens.find_by_raw(raw).await?;
                if let Some(session) = session.filter(|s| s.user_id == cmd.user_id) {
                    self.deps.refresh_tokens.revoke(session.id).await?;
                }
            }
            info!(user_id = %cmd.user_id, "Logged out");
        }

        self.deps
            .events
            .publish(AuthEvent::UserLoggedOut {
                user_id: cmd.user_id,
                token_id: cmd.token_id,
                all_sessions: cmd.logout_all,
            })
            .await;
        Ok(())
    }
}
