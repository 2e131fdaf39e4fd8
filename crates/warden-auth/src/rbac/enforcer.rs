//! Permission and role checks against access token claims.

use warden_core::error::AppError;

use crate::jwt::AccessClaims;

/// Enforces role-based access control for authenticated requests.
///
/// A `system:admin` permission satisfies every permission check.
#[derive(Debug, Clone, Copy, Default)]
pub struct RbacEnforcer;

impl RbacEnforcer {
    /// Creates a new enforcer.
    pub fn new() -> Self {
        Self
    }

    /// Checks whether the claims grant the permission (returns bool).
    pub fn has_permission(&self, claims: &AccessClaims, permission: &str) -> bool {
        claims.is_system_admin() || claims.permissions.iter().any(|p| p == permission)
    }

    /// Checks whether the claims grant the permission.
    ///
    /// Returns `Ok(())` if allowed, or an authorization error if denied.
    pub fn require_permission(
        &self,
        claims: &AccessClaims,
        permission: &str,
    ) -> Result<(), AppError> {
        if self.has_permission(claims, permission) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Missing required permission '{permission}'"
            )))
        }
    }

    /// Checks whether the claims carry the named role.
    pub fn require_role(&self, claims: &AccessClaims, role: &str) -> Result<(), AppError> {
        if claims.is_system_admin() || claims.roles.iter().any(|r| r == role) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!("Missing required role '{role}'")))
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;
    use warden_core::error::ErrorKind;

    use super::*;

    fn claims(roles: &[&str], permissions: &[&str]) -> AccessClaims {
        AccessClaims {
            sub: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            roles: roles.iter().map(|s| s.to_string()).collect(),
            permissions: permissions.iter().map(|s| s.to_string()).collect(),
            jti: Uuid::new_v4().to_string(),
            iat: 0,
            exp: 0,
            iss: "warden".to_string(),
        }
    }

    #[test]
    fn test_permission_checks() {
        let enforcer = RbacEnforcer::new();
        let c = claims(&["viewer"], &["users:read"]);

        assert!(enforcer.has_permission(&c, "users:read"));
        assert!(!enforcer.has_permission(&c, "users:write"));
        let err = enforcer.require_permission(&c, "users:write").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[test]
    fn test_system_admin_short_circuits() {
        let enforcer = RbacEnforcer::new();
        let c = claims(&[], &["system:admin"]);
        assert!(enforcer.require_permission(&c, "anything:at_all").is_ok());
        assert!(enforcer.require_role(&c, "editor").is_ok());
    }

    #[test]
    fn test_role_check() {
        let enforcer = RbacEnforcer::new();
        let c = claims(&["editor"], &[]);
        assert!(enforcer.require_role(&c, "editor").is_ok());
        assert!(enforcer.require_role(&c, "admin").is_err());
    }
}
