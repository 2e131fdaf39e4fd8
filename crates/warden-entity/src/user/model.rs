//! User aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use warden_core::error::AppError;

use super::status::UserStatus;

/// A registered account.
///
/// Fields are public for persistence mapping, but state changes go through
/// the domain methods so `updated_at` and the status rules stay consistent.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Login email, stored normalised (trimmed, lowercase).
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Human-readable name.
    pub full_name: String,
    /// Account status.
    pub status: UserStatus,
    /// Assigned role IDs.
    pub role_ids: Vec<Uuid>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, not yet activated user.
    pub fn register(email: &str, password_hash: String, full_name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            password_hash,
            full_name: full_name.trim().to_string(),
            status: UserStatus::Inactive,
            role_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Move an inactive account to active. Banned accounts stay banned.
    pub fn activate(&mut self) -> Result<(), AppError> {
        match self.status {
            UserStatus::Active => Ok(()),
            UserStatus::Inactive => {
                self.status = UserStatus::Active;
                self.touch();
                Ok(())
            }
            UserStatus::Banned => Err(AppError::account_inactive(
                "Banned accounts cannot be activated",
            )),
        }
    }

    /// Replace the stored password hash.
    pub fn change_password(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.touch();
    }

    /// Assign a role. Assigning a role twice is a no-op.
    pub fn assign_role(&mut self, role_id: Uuid) {
        if !self.role_ids.contains(&role_id) {
            self.role_ids.push(role_id);
            self.touch();
        }
    }

    /// Whether the account may authenticate.
    pub fn is_active(&self) -> bool {
        self.status.can_login()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Normalise an email for storage, lookup, and lockout keys.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Public view of a user returned with tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID.
    pub id: Uuid,
    /// Email.
    pub email: String,
    /// Full name.
    pub full_name: String,
    /// Account status.
    pub status: UserStatus,
    /// Resolved role names.
    pub roles: Vec<String>,
    /// Resolved permission codes.
    pub permissions: Vec<String>,
}

impl UserProfile {
    /// Build a profile from a user and its resolved access.
    pub fn new(user: &User, roles: Vec<String>, permissions: Vec<String>) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            status: user.status,
            roles,
            permissions,
        }
    }
}
