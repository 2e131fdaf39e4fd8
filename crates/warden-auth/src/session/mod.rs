//! Refresh token lifecycle, password reset tokens, and expired-token cleanup.

pub mod cleanup;
pub mod refresh;
pub mod reset;

pub use cleanup::SessionCleanup;
pub use refresh::{IssuedRefreshToken, RefreshTokenStore};
pub use reset::{ClaimedReset, IssuedResetToken, PasswordResetStore};
