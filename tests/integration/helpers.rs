//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use warden_api::AppState;
use warden_auth::lockout::MemoryLockoutStore;
use warden_auth::{AccountLockout, LockoutPolicy, RateLimiter};
use warden_cache::CacheManager;
use warden_core::config::{AuthConfig, ServerConfig};
use warden_database::memory::{
    MemoryPermissionRepository, MemoryRefreshTokenRepository, MemoryRoleRepository,
    MemoryUserRepository,
};
use warden_database::repositories::RefreshTokenRepository;
use warden_entity::role::{Permission, Role};
use warden_service::auth::Repositories;
use warden_service::{
    AuthDeps, AuthService, BroadcastEventBus, LoginCommand, RefreshTokenCommand, RegisterCommand,
};

/// A password that satisfies the strength policy.
pub const PASSWORD: &str = "Tr0ub4dor&Horse-Battery";
/// A second strong password.
pub const NEW_PASSWORD: &str = "Correct-Horse-Battery-9";

/// Knobs for building a test application.
pub struct TestOptions {
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
    pub lockout: LockoutPolicy,
    pub burst_size: u32,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            refresh_tokens: Arc::new(MemoryRefreshTokenRepository::new()),
            lockout: LockoutPolicy {
                max_attempts: 3,
                lockout_duration: Duration::from_secs(60),
                attempt_window: Duration::from_secs(60),
            },
            burst_size: 100,
        }
    }
}

/// Test application context.
pub struct TestApp {
    /// The Axum router for making test requests.
    pub router: Router,
    /// The service behind the router.
    pub service: AuthService,
    /// Refresh token storage, for direct inspection.
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
}

impl TestApp {
    /// Create a test application with default options.
    pub async fn new() -> Self {
        Self::with_options(TestOptions::default()).await
    }

    /// Create a test application.
    pub async fn with_options(options: TestOptions) -> Self {
        let mut config = AuthConfig::default();
        config.argon2.memory_kib = 1024;
        config.argon2.iterations = 1;

        let permissions = Arc::new(MemoryPermissionRepository::new());
        let read = Permission::new("sessions:read");
        let read_id = read.id;
        permissions.insert(read).await;

        let roles = Arc::new(MemoryRoleRepository::new());
        roles.insert(Role::new("user", true, vec![read_id])).await;

        let repos = Repositories {
            users: Arc::new(MemoryUserRepository::new()),
            roles,
            permissions,
            refresh_tokens: Arc::clone(&options.refresh_tokens),
        };

        let cache = CacheManager::in_memory();
        let lockout = AccountLockout::new(Arc::new(MemoryLockoutStore::new(1_000)), options.lockout);
        let deps = AuthDeps::new(
            &config,
            repos,
            cache.clone(),
            lockout,
            Arc::new(BroadcastEventBus::new(64)),
        )
        .expect("Failed to wire auth dependencies");

        let service = AuthService::new(Arc::new(deps));
        let limiter = Arc::new(RateLimiter::new(
            1.0,
            options.burst_size,
            Duration::from_secs(60),
        ));
        let state = AppState::new(service.clone(), limiter, true, cache);

        Self {
            router: warden_api::build_router(state, &ServerConfig::default()),
            service,
            refresh_tokens: options.refresh_tokens,
        }
    }

    /// Make a JSON request against the router.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .header("X-Forwarded-For", "203.0.113.10");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            retry_after,
        }
    }
}

/// Response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Parsed JSON body, or null.
    pub body: Value,
    /// `Retry-After` header, if present.
    pub retry_after: Option<String>,
}

impl TestResponse {
    /// A string field of the success payload.
    pub fn data_str(&self, field: &str) -> String {
        self.body["data"][field]
            .as_str()
            .unwrap_or_else(|| panic!("missing data.{field} in {}", self.body))
            .to_string()
    }
}

pub fn register_cmd(email: &str) -> RegisterCommand {
    RegisterCommand {
        email: email.to_string(),
        password: PASSWORD.to_string(),
        full_name: "Integration User".to_string(),
        ip_address: Some("203.0.113.10".to_string()),
        user_agent: Some("integration".to_string()),
    }
}

pub fn login_cmd(email: &str, password: &str) -> LoginCommand {
    LoginCommand {
        email: email.to_string(),
        password: password.to_string(),
        ip_address: None,
        user_agent: None,
    }
}

pub fn refresh_cmd(raw: &str) -> RefreshTokenCommand {
    RefreshTokenCommand {
        refresh_token: raw.to_string(),
        ip_address: None,
        user_agent: None,
    }
}
