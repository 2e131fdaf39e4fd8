//! Roles and permissions (read-mostly reference data).

pub mod model;

pub use model::{Permission, Role, SYSTEM_ADMIN};
