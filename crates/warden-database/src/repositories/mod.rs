//! Repository interfaces and their PostgreSQL implementations.
//!
//! Handlers depend on the traits only, so the same command code runs against
//! PostgreSQL in production and against [`crate::memory`] in tests.

pub mod refresh_token;
pub mod role;
pub mod user;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use warden_core::result::AppResult;
use warden_entity::role::{Permission, Role};
use warden_entity::token::RefreshToken;
use warden_entity::user::User;

pub use refresh_token::PgRefreshTokenRepository;
pub use role::{PgPermissionRepository, PgRoleRepository};
pub use user::PgUserRepository;

/// User persistence.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Find a user by normalised email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Whether an account with this normalised email exists.
    async fn exists_by_email(&self, email: &str) -> AppResult<bool>;

    /// Insert a new user. A duplicate email yields a `Conflict` error.
    async fn create(&self, user: &User) -> AppResult<()>;

    /// Persist changes to an existing user.
    async fn update(&self, user: &User) -> AppResult<()>;
}

/// Role lookup.
#[async_trait]
pub trait RoleRepository: Send + Sync + 'static {
    /// Fetch the roles with the given IDs. Unknown IDs are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Role>>;

    /// The role assigned to newly registered users, if one is configured.
    async fn find_default(&self) -> AppResult<Option<Role>>;
}

/// Permission lookup.
#[async_trait]
pub trait PermissionRepository: Send + Sync + 'static {
    /// Fetch the permissions with the given IDs. Unknown IDs are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Permission>>;
}

/// Refresh token persistence.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync + 'static {
    /// Insert a new active token.
    async fn create(&self, token: &RefreshToken) -> AppResult<()>;

    /// Find a token by the hash of its raw value, in any state.
    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<RefreshToken>>;

    /// Find a token by session ID, in any state.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RefreshToken>>;

    /// Revoke a token if it is not revoked yet.
    ///
    /// Returns `true` only for the caller that performed the transition, so
    /// two concurrent callers can never both observe success.
    async fn revoke(&self, id: Uuid) -> AppResult<bool>;

    /// Revoke every non-revoked token of a user. Returns how many changed.
    async fn revoke_all_by_user_id(&self, user_id: Uuid) -> AppResult<u64>;

    /// Non-revoked, non-expired tokens of a user, newest first.
    async fn find_active_by_user_id(&self, user_id: Uuid) -> AppResult<Vec<RefreshToken>>;

    /// Delete tokens that expired before `before`. Returns how many were removed.
    async fn delete_expired(&self, before: DateTime<Utc>) -> AppResult<u64>;
}
