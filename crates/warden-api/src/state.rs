//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use warden_auth::{RateLimiter, RbacEnforcer, TokenBlacklist, TokenGenerator};
use warden_cache::CacheManager;
use warden_service::AuthService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. Every field is
/// cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Authentication command handlers.
    pub auth: AuthService,
    /// Access token parser.
    pub tokens: TokenGenerator,
    /// Revoked access tokens.
    pub blacklist: TokenBlacklist,
    /// Permission and role guard.
    pub rbac: RbacEnforcer,
    /// Per-client limiter for the public routes.
    pub rate_limiter: Arc<RateLimiter>,
    /// Whether the limiter is applied.
    pub rate_limit_enabled: bool,
    /// Cache, probed by the health check.
    pub cache: CacheManager,
}

impl AppState {
    /// Build state around a wired service. Token parsing and the blacklist
    /// share the service's instances.
    pub fn new(
        auth: AuthService,
        rate_limiter: Arc<RateLimiter>,
        rate_limit_enabled: bool,
        cache: CacheManager,
    ) -> Self {
        let deps = auth.deps();
        Self {
            tokens: deps.tokens.clone(),
            blacklist: deps.blacklist.clone(),
            rbac: RbacEnforcer::new(),
            auth,
            rate_limiter,
            rate_limit_enabled,
            cache,
        }
    }
}
