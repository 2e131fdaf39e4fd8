//! # warden-api
//!
//! HTTP boundary for Warden built on Axum.
//!
//! Maps requests onto the command handlers of `warden-service`, extracts
//! and validates bearer tokens, applies rate limiting to the public auth
//! routes, and turns [`warden_core::AppError`] into status codes.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
