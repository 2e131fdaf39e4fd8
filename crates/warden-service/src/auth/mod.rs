//! Authentication command handlers.

pub mod commands;
pub mod deps;
pub mod login;
pub mod logout;
pub mod password;
pub mod refresh;
pub mod register;
pub mod service;
pub mod session;

#[cfg(test)]
mod test_support;

pub use commands::{
    ForgotPasswordCommand, LoginCommand, LogoutCommand, RefreshTokenCommand, RegisterCommand,
    ResetPasswordCommand, RevokeSessionCommand,
};
pub use deps::{AuthDeps, Repositories};
pub use login::LoginHandler;
pub use logout::LogoutHandler;
pub use password::{ForgotPasswordHandler, ResetPasswordHandler};
pub use refresh::RefreshTokenHandler;
pub use register::RegisterHandler;
pub use service::AuthService;
pub use session::{ListSessionsHandler, RevokeSessionHandler};
