//! # warden-core
//!
//! Core crate for Warden. Contains the unified error system, configuration
//! schemas, authentication domain events, and the traits implemented by the
//! cache and event-bus crates.
//!
//! This crate has **no** internal dependencies on other Warden crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
