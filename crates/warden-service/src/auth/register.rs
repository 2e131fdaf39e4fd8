//! Register handler.

use std::sync::Arc;

use tracing::{info, warn};
use validator::ValidateEmail;

use warden_core::error::AppError;
use warden_core::events::AuthEvent;
use warden_core::result::AppResult;
use warden_entity::token::AuthResponse;
use warden_entity::user::User;
use warden_entity::user::model::normalize_email;

use super::commands::RegisterCommand;
use super::deps::{AuthDeps, auth_response};

/// Creates an active account and its first session.
#[derive(Debug, Clone)]
pub struct RegisterHandler {
    deps: Arc<AuthDeps>,
}

impl RegisterHandler {
    /// Create a new handler.
    pub fn new(deps: Arc<AuthDeps>) -> Self {
        Self { deps }
    }

    /// Validate the input, store the user, and issue a token pair.
    pub async fn handle(&self, cmd: RegisterCommand) -> AppResult<AuthResponse> {
        let email = normalize_email(&cmd.email);
        if !email.validate_email() {
            return Err(AppError::validation_field("email", "Invalid email address"));
        }
        if cmd.full_name.trim().is_empty() {
            return Err(AppError::validation_field(
                "full_name",
                "Full name must not be empty",
            ));
        }
        self.deps.password_policy.validate(&cmd.password)?;

        if self.deps.users.exists_by_email(&email).await? {
            return Err(AppError::conflict("Email is already registered"));
        }

        let password_hash = self.deps.hasher.hash_password(&cmd.password).await?;
        let mut user = User::register(&email, password_hash, &cmd.full_name);

        match self.deps.roles.find_default().await {
            Ok(Some(role)) => user.assign_role(role.id),
            Ok(None) => warn!("No default role configured; user registered without roles"),
            Err(e) => warn!(error = %e, "Failed to load default role"),
        }

        user.activate()?;
        self.deps.users.create(&user).await?;

        let access = self.deps.rbac.resolve(&user.role_ids).await;
        let access_token = self.deps.access_token(&user, &access)?;
        let refresh = self
            .deps
            .refresh_tokens
            .issue(user.id, cmd.user_agent, cmd.ip_address)
            .await?;

        info!(user_id = %user.id, "User registered");
        self.deps
            .events
            .publish(AuthEvent::UserRegistered {
                user_id: user.id,
                email: user.email.clone(),
            })
            .await;

        Ok(auth_response(&user, access, access_token, refresh))
    }
}
