//! Role and permission entity models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Permission code that satisfies every permission check.
pub const SYSTEM_ADMIN: &str = "system:admin";

/// A named bundle of permissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Role {
    /// Role ID.
    pub id: Uuid,
    /// Unique role name.
    pub name: String,
    /// Whether this role is assigned on registration.
    pub is_default: bool,
    /// Granted permission IDs.
    pub permission_ids: Vec<Uuid>,
}

impl Role {
    /// Create a role with a fresh ID.
    pub fn new(name: &str, is_default: bool, permission_ids: Vec<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            is_default,
            permission_ids,
        }
    }
}

/// A single grantable capability, identified by a `resource:action` code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct Permission {
    /// Permission ID.
    pub id: Uuid,
    /// Permission code, e.g. `"users:read"`.
    pub code: String,
}

impl Permission {
    /// Create a permission with a fresh ID.
    pub fn new(code: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.to_string(),
        }
    }

    /// Whether this is the all-powerful sentinel permission.
    pub fn is_system_admin(&self) -> bool {
        self.code == SYSTEM_ADMIN
    }
}
