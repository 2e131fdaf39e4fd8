//! Failed-login tracking and temporary lockout.

pub mod store;
pub mod tracker;

pub use store::{CacheLockoutStore, LockoutState, LockoutStore, MemoryLockoutStore};
pub use tracker::{AccountLockout, LockoutPolicy};
