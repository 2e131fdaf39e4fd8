//! Permission guards for authenticated handlers.

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Require a permission on the caller's token.
pub fn require_permission(
    state: &AppState,
    auth: &AuthUser,
    permission: &str,
) -> Result<(), ApiError> {
    state
        .rbac
        .require_permission(auth.claims(), permission)
        .map_err(ApiError::from)
}

/// Require a role on the caller's token.
pub fn require_role(state: &AppState, auth: &AuthUser, role: &str) -> Result<(), ApiError> {
    state
        .rbac
        .require_role(auth.claims(), role)
        .map_err(ApiError::from)
}
