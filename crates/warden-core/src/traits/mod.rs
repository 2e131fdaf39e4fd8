//! Core traits defined in `warden-core` and implemented by other crates.

pub mod cache;
pub mod event_bus;

pub use cache::CacheProvider;
pub use event_bus::EventBus;
