//! Route definitions for the Warden HTTP API.
//!
//! Auth routes are mounted under `/api/auth`. The public ones sit behind
//! the rate limiter; the rest authenticate through [`AuthUser`].
//!
//! [`AuthUser`]: crate::extractors::AuthUser

use std::time::Duration;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use warden_core::config::ServerConfig;

use crate::handlers;
use crate::middleware::cors::build_cors_layer;
use crate::middleware::rate_limit::rate_limit;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let auth = Router::new()
        .merge(public_auth_routes(state.clone()))
        .merge(protected_auth_routes());

    Router::new()
        .nest("/api/auth", auth)
        .route("/health", get(handlers::health::health))
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_seconds,
        )))
        .layer(build_cors_layer(server))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Unauthenticated endpoints, rate limited per client.
fn public_auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh))
        .route("/forgot-password", post(handlers::auth::forgot_password))
        .route("/reset-password", post(handlers::auth::reset_password))
        .route_layer(axum_middleware::from_fn_with_state(state, rate_limit))
}

/// Endpoints that require a bearer token.
fn protected_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::me))
        .route("/sessions", get(handlers::session::list_sessions))
        .route("/sessions/{id}", delete(handlers::session::revoke_session))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use warden_auth::{AccessClaims, AccountLockout, LockoutPolicy, RateLimiter};
    use warden_auth::lockout::MemoryLockoutStore;
    use warden_cache::CacheManager;
    use warden_core::config::AuthConfig;
    use warden_database::memory::{
        MemoryPermissionRepository, MemoryRefreshTokenRepository, MemoryRoleRepository,
        MemoryUserRepository,
    };
    use warden_service::auth::Repositories;
    use warden_service::{AuthDeps, AuthService, BroadcastEventBus};

    use super::*;
    use crate::extractors::AuthUser;
    use crate::middleware::rbac::require_permission;

    fn state(burst: u32) -> AppState {
        let mut config = AuthConfig::default();
        config.argon2.memory_kib = 1024;
        config.argon2.iterations = 1;

        let repos = Repositories {
            users: Arc::new(MemoryUserRepository::new()),
            roles: Arc::new(MemoryRoleRepository::new()),
            permissions: Arc::new(MemoryPermissionRepository::new()),
            refresh_tokens: Arc::new(MemoryRefreshTokenRepository::new()),
        };
        let lockout = AccountLockout::new(
            Arc::new(MemoryLockoutStore::new(100)),
            LockoutPolicy {
                max_attempts: 5,
                lockout_duration: Duration::from_secs(60),
                attempt_window: Duration::from_secs(60),
            },
        );
        let cache = CacheManager::in_memory();
        let deps = AuthDeps::new(
            &config,
            repos,
            cache.clone(),
            lockout,
            Arc::new(BroadcastEventBus::new(8)),
        )
        .unwrap();

        AppState::new(
            AuthService::new(Arc::new(deps)),
            Arc::new(RateLimiter::new(1.0, burst, Duration::from_secs(60))),
            true,
            cache,
        )
    }

    fn app(state: AppState) -> Router {
        build_router(state, &ServerConfig::default())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(state(5))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_route_requires_bearer() {
        let response = app(state(5))
            .oneshot(Request::get("/api/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(state(5))
            .oneshot(
                Request::get("/api/auth/me")
                    .header(header::AUTHORIZATION, "Bearer not.a.jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_public_routes_rate_limited() {
        let app = app(state(2));
        let login = || {
            Request::post("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-forwarded-for", "198.51.100.9")
                .body(Body::from(
                    r#"{"email":"nobody@example.com","password":"whatever"}"#,
                ))
                .unwrap()
        };

        for _ in 0..2 {
            let response = app.clone().oneshot(login()).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
        let response = app.clone().oneshot(login()).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(header::RETRY_AFTER));
    }

    #[tokio::test]
    async fn test_validation_error_names_field() {
        let response = app(state(5))
            .oneshot(
                Request::post("/api/auth/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"email":"nope","password":"x","full_name":"A"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "VALIDATION");
        assert_eq!(json["field"], "email");
    }

    #[test]
    fn test_permission_guard() {
        let state = state(5);
        let user = AuthUser(AccessClaims {
            sub: uuid::Uuid::new_v4(),
            email: "a@example.com".into(),
            roles: vec!["user".into()],
            permissions: vec!["files:read".into()],
            jti: "jti".into(),
            iat: 0,
            exp: 0,
            iss: "warden".into(),
        });

        assert!(require_permission(&state, &user, "files:read").is_ok());
        let err = require_permission(&state, &user, "files:delete").unwrap_err();
        assert_eq!(
            crate::error::status_for(err.0.kind),
            StatusCode::FORBIDDEN
        );
    }
}
