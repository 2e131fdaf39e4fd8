//! # warden-auth
//!
//! The leaf components of the authentication core.
//!
//! ## Modules
//!
//! - `jwt`: access token claims, signing, and typed verification errors
//! - `token`: the `TokenGenerator` facade plus opaque refresh/reset tokens
//! - `password`: Argon2id hashing and strength policy
//! - `lockout`: per-identifier failed-attempt tracking with pluggable stores
//! - `blacklist`: revoked access token registry
//! - `rate_limit`: per-key token bucket admission control
//! - `rbac`: role/permission resolution and enforcement
//! - `session`: refresh token lifecycle, reset tokens, expired-token cleanup

pub mod blacklist;
pub mod jwt;
pub mod lockout;
pub mod password;
pub mod rate_limit;
pub mod rbac;
pub mod session;
pub mod token;

pub use blacklist::TokenBlacklist;
pub use jwt::{AccessClaims, TokenError};
pub use lockout::{AccountLockout, LockoutPolicy, LockoutStore};
pub use password::{PasswordHasher, PasswordValidator};
pub use rate_limit::RateLimiter;
pub use rbac::{RbacEnforcer, RbacResolver, ResolvedAccess};
pub use session::{PasswordResetStore, RefreshTokenStore, SessionCleanup};
pub use token::{IssuedAccessToken, TokenGenerator};
