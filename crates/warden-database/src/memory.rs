//! Process-local repository implementations.
//!
//! Used by the `memory` database backend and by tests. Each repository keeps
//! its rows behind a `tokio::sync::RwLock`; the write lock makes the
//! compare-and-set in [`RefreshTokenRepository::revoke`] atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_entity::role::{Permission, Role};
use warden_entity::token::RefreshToken;
use warden_entity::user::User;

use crate::repositories::{
    PermissionRepository, RefreshTokenRepository, RoleRepository, UserRepository,
};

/// In-memory user store keyed by ID.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        Ok(self.users.read().await.values().any(|u| u.email == email))
    }

    async fn create(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::conflict("Email is already registered"));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(AppError::not_found(format!("User {} not found", user.id))),
        }
    }
}

/// In-memory role store.
#[derive(Debug, Default)]
pub struct MemoryRoleRepository {
    roles: RwLock<HashMap<Uuid, Role>>,
}

impl MemoryRoleRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a role.
    pub async fn insert(&self, role: Role) {
        self.roles.write().await.insert(role.id, role);
    }
}

#[async_trait]
impl RoleRepository for MemoryRoleRepository {
    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Role>> {
        let roles = self.roles.read().await;
        let mut found: Vec<Role> = ids.iter().filter_map(|id| roles.get(id).cloned()).collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found.dedup_by_key(|r| r.id);
        Ok(found)
    }

    async fn find_default(&self) -> AppResult<Option<Role>> {
        Ok(self.roles.read().await.values().find(|r| r.is_default).cloned())
    }
}

/// In-memory permission store.
#[derive(Debug, Default)]
pub struct MemoryPermissionRepository {
    permissions: RwLock<HashMap<Uuid, Permission>>,
}

impl MemoryPermissionRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a permission.
    pub async fn insert(&self, permission: Permission) {
        self.permissions
            .write()
            .await
            .insert(permission.id, permission);
    }
}

#[async_trait]
impl PermissionRepository for MemoryPermissionRepository {
    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Permission>> {
        let permissions = self.permissions.read().await;
        let mut found: Vec<Permission> = ids
            .iter()
            .filter_map(|id| permissions.get(id).cloned())
            .collect();
        found.sort_by(|a, b| a.code.cmp(&b.code));
        found.dedup_by_key(|p| p.id);
        Ok(found)
    }
}

/// In-memory refresh token store keyed by session ID.
#[derive(Debug, Default)]
pub struct MemoryRefreshTokenRepository {
    tokens: RwLock<HashMap<Uuid, RefreshToken>>,
}

impl MemoryRefreshTokenRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows in any state.
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Whether no rows are stored.
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl RefreshTokenRepository for MemoryRefreshTokenRepository {
    async fn create(&self, token: &RefreshToken) -> AppResult<()> {
        let mut tokens = self.tokens.write().await;
        if tokens.values().any(|t| t.token_hash == token.token_hash) {
            return Err(AppError::conflict("Refresh token hash already exists"));
        }
        tokens.insert(token.id, token.clone());
        Ok(())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<RefreshToken>> {
        let tokens = self.tokens.read().await;
        Ok(tokens.values().find(|t| t.token_hash == token_hash).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RefreshToken>> {
        Ok(self.tokens.read().await.get(&id).cloned())
    }

    async fn revoke(&self, id: Uuid) -> AppResult<bool> {
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(&id) {
            Some(token) if !token.revoked => {
                token.revoked = true;
                token.revoked_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_by_user_id(&self, user_id: Uuid) -> AppResult<u64> {
        let mut tokens = self.tokens.write().await;
        let now = Utc::now();
        let mut count = 0;
        for token in tokens
            .values_mut()
            .filter(|t| t.user_id == user_id && !t.revoked)
        {
            token.revoked = true;
            token.revoked_at = Some(now);
            count += 1;
        }
        Ok(count)
    }

    async fn find_active_by_user_id(&self, user_id: Uuid) -> AppResult<Vec<RefreshToken>> {
        let tokens = self.tokens.read().await;
        let mut active: Vec<RefreshToken> = tokens
            .values()
            .filter(|t| t.user_id == user_id && t.is_active())
            .cloned()
            .collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(active)
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let mut tokens = self.tokens.write().await;
        let len = tokens.len();
        tokens.retain(|_, t| t.expires_at >= before);
        Ok((len - tokens.len()) as u64)
    }
}
