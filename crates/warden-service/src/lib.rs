//! # warden-service
//!
//! Command handlers for the authentication core. Each handler takes an
//! explicit command struct, orchestrates the leaf components from
//! `warden-auth` against the repositories, and publishes domain events.
//!
//! Handlers follow constructor injection: all dependencies are provided at
//! construction time through [`AuthDeps`].

pub mod auth;
pub mod events;

pub use auth::{
    AuthDeps, AuthService, ForgotPasswordCommand, LoginCommand, LogoutCommand,
    RefreshTokenCommand, RegisterCommand, ResetPasswordCommand, RevokeSessionCommand,
};
pub use events::{BroadcastEventBus, EventLogger, EventPublisher};
