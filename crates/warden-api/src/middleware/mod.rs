//! Tower and Axum middleware.

pub mod cors;
pub mod rate_limit;
pub mod rbac;
