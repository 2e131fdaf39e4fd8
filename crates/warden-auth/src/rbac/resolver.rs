//! Resolves role IDs into role names and effective permission codes.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use warden_database::repositories::{PermissionRepository, RoleRepository};

/// Role names and permission codes granted to a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAccess {
    /// Role names, sorted.
    pub roles: Vec<String>,
    /// Permission codes across all roles, deduplicated and sorted.
    pub permissions: Vec<String>,
}

/// Loads roles in one batch, then the union of their permissions in another.
#[derive(Clone)]
pub struct RbacResolver {
    roles: Arc<dyn RoleRepository>,
    permissions: Arc<dyn PermissionRepository>,
}

impl std::fmt::Debug for RbacResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RbacResolver").finish_non_exhaustive()
    }
}

impl RbacResolver {
    /// Create a resolver over the role and permission repositories.
    pub fn new(roles: Arc<dyn RoleRepository>, permissions: Arc<dyn PermissionRepository>) -> Self {
        Self { roles, permissions }
    }

    /// Resolve the given role IDs.
    ///
    /// Repository failures degrade to empty access: the user still
    /// authenticates but holds no permissions.
    pub async fn resolve(&self, role_ids: &[Uuid]) -> ResolvedAccess {
        if role_ids.is_empty() {
            return ResolvedAccess::default();
        }

        let roles = match self.roles.find_by_ids(role_ids).await {
            Ok(roles) => roles,
            Err(e) => {
                warn!(error = %e, "Failed to load roles; granting no access");
                return ResolvedAccess::default();
            }
        };

        let permission_ids: Vec<Uuid> = roles
            .iter()
            .flat_map(|role| role.permission_ids.iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let permissions = match self.permissions.find_by_ids(&permission_ids).await {
            Ok(permissions) => permissions,
            Err(e) => {
                warn!(error = %e, "Failed to load permissions; granting no access");
                return ResolvedAccess::default();
            }
        };

        ResolvedAccess {
            roles: roles
                .into_iter()
                .map(|r| r.name)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            permissions: permissions
                .into_iter()
                .map(|p| p.code)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        }
    }
}
