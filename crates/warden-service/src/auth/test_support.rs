//! Shared fixtures for handler tests.

use std::sync::Arc;
use std::time::Duration;

use warden_auth::{AccessClaims, AccountLockout, LockoutPolicy};
use warden_auth::lockout::MemoryLockoutStore;
use warden_cache::CacheManager;
use warden_core::config::AuthConfig;
use warden_database::memory::{
    MemoryPermissionRepository, MemoryRefreshTokenRepository, MemoryRoleRepository,
    MemoryUserRepository,
};
use warden_database::repositories::RefreshTokenRepository;
use warden_entity::role::{Permission, Role};

use super::commands::{
    ForgotPasswordCommand, LoginCommand, LogoutCommand, RefreshTokenCommand, RegisterCommand,
    ResetPasswordCommand,
};
use super::deps::{AuthDeps, Repositories};
use super::service::AuthService;
use crate::events::BroadcastEventBus;

pub const PASSWORD: &str = "Tr0ub4dor&Horse-Battery";

pub struct TestContext {
    pub service: AuthService,
    pub deps: Arc<AuthDeps>,
    pub refresh_repo: Arc<MemoryRefreshTokenRepository>,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_refresh_tokens(|repo| repo as Arc<dyn RefreshTokenRepository>).await
    }

    /// Build a context whose refresh token repository wraps the in-memory one.
    pub async fn with_refresh_tokens(
        wrap: impl FnOnce(Arc<MemoryRefreshTokenRepository>) -> Arc<dyn RefreshTokenRepository>,
    ) -> Self {
        let mut config = AuthConfig::default();
        config.argon2.memory_kib = 1024;
        config.argon2.iterations = 1;

        let permissions = Arc::new(MemoryPermissionRepository::new());
        let read = Permission::new("files:read");
        let read_id = read.id;
        permissions.insert(read).await;

        let roles = Arc::new(MemoryRoleRepository::new());
        roles.insert(Role::new("user", true, vec![read_id])).await;

        let refresh_repo = Arc::new(MemoryRefreshTokenRepository::new());
        let repos = Repositories {
            users: Arc::new(MemoryUserRepository::new()),
            roles,
            permissions,
            refresh_tokens: wrap(refresh_repo.clone()),
        };

        let lockout = AccountLockout::new(
            Arc::new(MemoryLockoutStore::new(1_000)),
            LockoutPolicy {
                max_attempts: 3,
                lockout_duration: Duration::from_secs(60),
                attempt_window: Duration::from_secs(60),
            },
        );

        let deps = Arc::new(
            AuthDeps::new(
                &config,
                repos,
                CacheManager::in_memory(),
                lockout,
                Arc::new(BroadcastEventBus::new(16)),
            )
            .unwrap(),
        );

        Self {
            service: AuthService::new(Arc::clone(&deps)),
            deps,
            refresh_repo,
        }
    }
}

pub fn register_cmd(email: &str) -> RegisterCommand {
    RegisterCommand {
        email: email.to_string(),
        password: PASSWORD.to_string(),
        full_name: "Test User".to_string(),
        ip_address: Some("127.0.0.1".to_string()),
        user_agent: Some("tests".to_string()),
    }
}

pub fn login_cmd(email: &str, password: &str) -> LoginCommand {
    LoginCommand {
        email: email.to_string(),
        password: password.to_string(),
        ip_address: Some("127.0.0.1".to_string()),
        user_agent: Some("tests".to_string()),
    }
}

pub fn refresh_cmd(raw: &str) -> RefreshTokenCommand {
    RefreshTokenCommand {
        refresh_token: raw.to_string(),
        ip_address: None,
        user_agent: None,
    }
}

pub fn logout_cmd(claims: &AccessClaims, logout_all: bool, refresh_token: Option<String>) -> LogoutCommand {
    LogoutCommand {
        user_id: claims.sub,
        token_id: claims.jti.clone(),
        token_expires_at: claims.exp,
        logout_all,
        refresh_token,
    }
}

pub fn forgot_cmd(email: &str) -> ForgotPasswordCommand {
    ForgotPasswordCommand {
        email: email.to_string(),
    }
}

pub fn reset_cmd(raw: &str, password: &str) -> ResetPasswordCommand {
    ResetPasswordCommand {
        reset_token: raw.to_string(),
        new_password: password.to_string(),
    }
}
