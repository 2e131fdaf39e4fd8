//! Event bus implementation and best-effort publication.

pub mod bus;
pub mod publisher;

pub use bus::{BroadcastEventBus, EventLogger};
pub use publisher::EventPublisher;
