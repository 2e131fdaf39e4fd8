//! Dependencies shared by every command handler.

use std::sync::Arc;

use warden_auth::session::IssuedRefreshToken;
use warden_auth::{
    AccountLockout, IssuedAccessToken, PasswordHasher, PasswordResetStore, PasswordValidator,
    RbacResolver, RefreshTokenStore, ResolvedAccess, TokenBlacklist, TokenGenerator,
};
use warden_cache::CacheManager;
use warden_core::config::AuthConfig;
use warden_core::result::AppResult;
use warden_core::traits::EventBus;
use warden_database::repositories::{
    PermissionRepository, RefreshTokenRepository, RoleRepository, UserRepository,
};
use warden_entity::token::AuthResponse;
use warden_entity::user::{User, UserProfile};

use crate::events::EventPublisher;

/// Token type reported with every issued pair.
const TOKEN_TYPE: &str = "Bearer";

/// The repositories the core reads and writes.
#[derive(Clone)]
pub struct Repositories {
    /// Users.
    pub users: Arc<dyn UserRepository>,
    /// Roles.
    pub roles: Arc<dyn RoleRepository>,
    /// Permissions.
    pub permissions: Arc<dyn PermissionRepository>,
    /// Refresh tokens.
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
}

/// Everything the handlers orchestrate.
#[derive(Clone)]
pub struct AuthDeps {
    /// User persistence.
    pub users: Arc<dyn UserRepository>,
    /// Role persistence, for the default role.
    pub roles: Arc<dyn RoleRepository>,
    /// Role and permission resolution.
    pub rbac: RbacResolver,
    /// Access token minting.
    pub tokens: TokenGenerator,
    /// Refresh token lifecycle.
    pub refresh_tokens: RefreshTokenStore,
    /// Pending password resets.
    pub reset_tokens: PasswordResetStore,
    /// Revoked access tokens.
    pub blacklist: TokenBlacklist,
    /// Failed login tracking.
    pub lockout: AccountLockout,
    /// Argon2 hashing.
    pub hasher: PasswordHasher,
    /// Password strength policy.
    pub password_policy: PasswordValidator,
    /// Best-effort event publication.
    pub events: EventPublisher,
}

impl std::fmt::Debug for AuthDeps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthDeps")
            .field("lockout", &self.lockout)
            .field("refresh_tokens", &self.refresh_tokens)
            .finish_non_exhaustive()
    }
}

impl AuthDeps {
    /// Wire the leaf components from configuration.
    pub fn new(
        config: &AuthConfig,
        repos: Repositories,
        cache: CacheManager,
        lockout: AccountLockout,
        bus: Arc<dyn EventBus>,
    ) -> AppResult<Self> {
        let tokens = TokenGenerator::new(config);
        Ok(Self {
            users: repos.users,
            roles: Arc::clone(&repos.roles),
            rbac: RbacResolver::new(repos.roles, repos.permissions),
            refresh_tokens: RefreshTokenStore::new(repos.refresh_tokens, tokens.clone(), config),
            tokens,
            reset_tokens: PasswordResetStore::new(cache.clone(), config),
            blacklist: TokenBlacklist::new(cache),
            lockout,
            hasher: PasswordHasher::new(&config.argon2)?,
            password_policy: PasswordValidator::new(config),
            events: EventPublisher::new(bus),
        })
    }

    /// Sign an access token for the user's resolved access.
    pub(crate) fn access_token(
        &self,
        user: &User,
        access: &ResolvedAccess,
    ) -> AppResult<IssuedAccessToken> {
        self.tokens
            .generate_access_token(user.id, &user.email, &access.roles, &access.permissions)
    }
}

/// Assemble the response returned by register, login, and refresh.
pub(crate) fn auth_response(
    user: &User,
    access: ResolvedAccess,
    access_token: IssuedAccessToken,
    refresh: IssuedRefreshToken,
) -> AuthResponse {
    AuthResponse {
        access_token: access_token.token,
        refresh_token: refresh.raw,
        token_type: TOKEN_TYPE.to_string(),
        access_expires_at: access_token.expires_at,
        refresh_expires_at: refresh.token.expires_at,
        session_id: refresh.token.id,
        user: UserProfile::new(user, access.roles, access.permissions),
    }
}
