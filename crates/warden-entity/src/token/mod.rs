//! Refresh token entities and token responses.

pub mod refresh;
pub mod response;

pub use refresh::{RefreshToken, RefreshTokenState};
pub use response::{AuthResponse, ForgotPasswordResult, SessionInfo};
