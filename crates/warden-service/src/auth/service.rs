//! Facade over the command handlers.

use std::sync::Arc;

use uuid::Uuid;

use warden_core::result::AppResult;
use warden_entity::token::{AuthResponse, ForgotPasswordResult, SessionInfo};

use super::commands::{
    ForgotPasswordCommand, LoginCommand, LogoutCommand, RefreshTokenCommand, RegisterCommand,
    ResetPasswordCommand, RevokeSessionCommand,
};
use super::deps::AuthDeps;
use super::login::LoginHandler;
use super::logout::LogoutHandler;
use super::password::{ForgotPasswordHandler, ResetPasswordHandler};
use super::refresh::RefreshTokenHandler;
use super::register::RegisterHandler;
use super::session::{ListSessionsHandler, RevokeSessionHandler};

/// Entry point for every authentication operation.
#[derive(Debug, Clone)]
pub struct AuthService {
    deps: Arc<AuthDeps>,
    register: RegisterHandler,
    login: LoginHandler,
    refresh: RefreshTokenHandler,
    logout: LogoutHandler,
    forgot_password: ForgotPasswordHandler,
    reset_password: ResetPasswordHandler,
    list_sessions: ListSessionsHandler,
    revoke_session: RevokeSessionHandler,
}

impl AuthService {
    /// Build every handler over shared dependencies.
    pub fn new(deps: Arc<AuthDeps>) -> Self {
        Self {
            register: RegisterHandler::new(Arc::clone(&deps)),
            login: LoginHandler::new(Arc::clone(&deps)),
            refresh: RefreshTokenHandler::new(Arc::clone(&deps)),
            logout: LogoutHandler::new(Arc::clone(&deps)),
            forgot_password: ForgotPasswordHandler::new(Arc::clone(&deps)),
            reset_password: ResetPasswordHandler::new(Arc::clone(&deps)),
            list_sessions: ListSessionsHandler::new(Arc::clone(&deps)),
            revoke_session: RevokeSessionHandler::new(Arc::clone(&deps)),
            deps,
        }
    }

    /// The shared dependencies.
    pub fn deps(&self) -> &AuthDeps {
        &self.deps
    }

    /// Register a new account.
    pub async fn register(&self, cmd: RegisterCommand) -> AppResult<AuthResponse> {
        self.register.handle(cmd).await
    }

    /// Log in with email and password.
    pub async fn login(&self, cmd: LoginCommand) -> AppResult<AuthResponse> {
        self.login.handle(cmd).await
    }

    /// Rotate a refresh token.
    pub async fn refresh(&self, cmd: RefreshTokenCommand) -> AppResult<AuthResponse> {
        self.refresh.handle(cmd).await
    }

    /// Log out.
    pub async fn logout(&self, cmd: LogoutCommand) -> AppResult<()> {
        self.logout.handle(cmd).await
    }

    /// Request a password reset token.
    pub async fn forgot_password(
        &self,
        cmd: ForgotPasswordCommand,
    ) -> AppResult<Option<ForgotPasswordResult>> {
        self.forgot_password.handle(cmd).await
    }

    /// Reset a password with a reset token.
    pub async fn reset_password(&self, cmd: ResetPasswordCommand) -> AppResult<()> {
        self.reset_password.handle(cmd).await
    }

    /// Active sessions of a user.
    pub async fn list_sessions(&self, user_id: Uuid) -> AppResult<Vec<SessionInfo>> {
        self.list_sessions.handle(user_id).await
    }

    /// Revoke one of the caller's sessions.
    pub async fn revoke_session(&self, cmd: RevokeSessionCommand) -> AppResult<()> {
        self.revoke_session.handle(cmd).await
    }
}
