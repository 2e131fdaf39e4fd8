//! Integration tests for Warden.
//!
//! Drives the `AuthService` and the HTTP router over in-memory repositories
//! and the moka cache.

mod api;
mod auth_flow;
mod helpers;
mod rotation;
