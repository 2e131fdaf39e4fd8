//! # warden-database
//!
//! Persistence for the authentication core. The core only sees the
//! repository traits in [`repositories`]; this crate provides a PostgreSQL
//! implementation of each (sqlx) and a process-local implementation used by
//! the `memory` backend and by tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{
    PermissionRepository, RefreshTokenRepository, RoleRepository, UserRepository,
};
