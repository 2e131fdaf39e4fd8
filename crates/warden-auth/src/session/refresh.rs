//! Refresh token issuance, validation, and rotation.
//!
//! Rotation is issue-then-revoke: the replacement row is written first and
//! the presented token is then claimed with a compare-and-set revoke. Only
//! the caller that wins the claim keeps its replacement; a loser revokes the
//! replacement it created, so a given token refreshes at most once.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_database::repositories::RefreshTokenRepository;
use warden_entity::token::{RefreshToken, RefreshTokenState};

use crate::token::TokenGenerator;

/// A persisted refresh token together with its raw value.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    /// Raw token handed to the client once.
    pub raw: String,
    /// The stored row.
    pub token: RefreshToken,
}

/// Lifecycle operations over the refresh token repository.
#[derive(Clone)]
pub struct RefreshTokenStore {
    repo: Arc<dyn RefreshTokenRepository>,
    generator: TokenGenerator,
    ttl: Duration,
    revoke_all_on_reuse: bool,
}

impl std::fmt::Debug for RefreshTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenStore")
            .field("ttl", &self.ttl)
            .field("revoke_all_on_reuse", &self.revoke_all_on_reuse)
            .finish_non_exhaustive()
    }
}

impl RefreshTokenStore {
    /// Create a store from configuration.
    pub fn new(
        repo: Arc<dyn RefreshTokenRepository>,
        generator: TokenGenerator,
        config: &AuthConfig,
    ) -> Self {
        Self {
            repo,
            generator,
            ttl: Duration::days(config.refresh_token_ttl_days as i64),
            revoke_all_on_reuse: config.revoke_all_on_refresh_reuse,
        }
    }

    /// Create and persist a new active token for the user.
    pub async fn issue(
        &self,
        user_id: Uuid,
        device_info: Option<String>,
        ip_address: Option<String>,
    ) -> AppResult<IssuedRefreshToken> {
        let raw = self.generator.generate_refresh_token();
        let token = RefreshToken::new(
            user_id,
            self.generator.hash_refresh_token(&raw),
            self.ttl,
            device_info,
            ip_address,
        );

        self.repo
            .create(&token)
            .await
            .map_err(|e| e.context("issue refresh token"))?;

        debug!(user_id = %user_id, session_id = %token.id, "Refresh token issued");
        Ok(IssuedRefreshToken { raw, token })
    }

    /// Look up a presented raw token and require it to be active.
    ///
    /// Unknown, revoked, and expired tokens all yield the same error.
    pub async fn validate(&self, raw: &str) -> AppResult<RefreshToken> {
        let Some(token) = self.find_by_raw(raw).await? else {
            return Err(AppError::invalid_refresh_token());
        };

        match token.state_at(Utc::now()) {
            RefreshTokenState::Active => Ok(token),
            RefreshTokenState::Expired => Err(AppError::invalid_refresh_token()),
            RefreshTokenState::Revoked => {
                warn!(
                    user_id = %token.user_id,
                    session_id = %token.id,
                    "Revoked refresh token presented again"
                );
                if self.revoke_all_on_reuse {
                    let revoked = self.revoke_all(token.user_id).await?;
                    warn!(
                        user_id = %token.user_id,
                        revoked,
                        "Revoked all sessions after refresh token reuse"
                    );
                }
                Err(AppError::invalid_refresh_token())
            }
        }
    }

    /// Replace `current` with a new token for the same user.
    pub async fn rotate(
        &self,
        current: &RefreshToken,
        device_info: Option<String>,
        ip_address: Option<String>,
    ) -> AppResult<IssuedRefreshToken> {
        let issued = self.issue(current.user_id, device_info, ip_address).await?;

        let claimed = self
            .repo
            .revoke(current.id)
            .await
            .map_err(|e| e.context("revoke rotated refresh token"))?;

        if !claimed {
            warn!(
                user_id = %current.user_id,
                session_id = %current.id,
                "Refresh token was already used; discarding replacement"
            );
            self.repo
                .revoke(issued.token.id)
                .await
                .map_err(|e| e.context("discard replacement refresh token"))?;
            return Err(AppError::invalid_refresh_token());
        }

        info!(
            user_id = %current.user_id,
            old_session_id = %current.id,
            new_session_id = %issued.token.id,
            "Refresh token rotated"
        );
        Ok(issued)
    }

    /// Look up a presented raw token in any state.
    pub async fn find_by_raw(&self, raw: &str) -> AppResult<Option<RefreshToken>> {
        let hash = self.generator.hash_refresh_token(raw);
        self.repo
            .find_by_token_hash(&hash)
            .await
            .map_err(|e| e.context("find refresh token"))
    }

    /// Fetch a session by ID in any state.
    pub async fn find(&self, session_id: Uuid) -> AppResult<Option<RefreshToken>> {
        self.repo
            .find_by_id(session_id)
            .await
            .map_err(|e| e.context("find session"))
    }

    /// Revoke one session. Returns `false` if it was already revoked.
    pub async fn revoke(&self, session_id: Uuid) -> AppResult<bool> {
        self.repo
            .revoke(session_id)
            .await
            .map_err(|e| e.context("revoke session"))
    }

    /// Revoke every active session of a user. Returns how many were revoked.
    pub async fn revoke_all(&self, user_id: Uuid) -> AppResult<u64> {
        self.repo
            .revoke_all_by_user_id(user_id)
            .await
            .map_err(|e| e.context("revoke all sessions"))
    }

    /// Active sessions of a user, newest first.
    pub async fn list_active(&self, user_id: Uuid) -> AppResult<Vec<RefreshToken>> {
        self.repo
            .find_active_by_user_id(user_id)
            .await
            .map_err(|e| e.context("list active sessions"))
    }

    /// The generator used to hash presented tokens.
    pub fn generator(&self) -> &TokenGenerator {
        &self.generator
    }
}
