//! # warden-entity
//!
//! Domain entity models for Warden. Every struct in this crate represents a
//! database table row or a value returned to callers of the authentication
//! core. Database entities additionally derive `sqlx::FromRow`.

pub mod role;
pub mod token;
pub mod user;
