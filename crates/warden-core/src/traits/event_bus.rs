//! Event bus trait for domain event publication.

use async_trait::async_trait;

use crate::events::DomainEvent;
use crate::result::AppResult;

/// Destination for domain events.
///
/// From the authentication core's perspective publication is
/// fire-and-forget: callers log a returned error and carry on.
/// Implementations must not block on slow subscribers.
#[async_trait]
pub trait EventBus: Send + Sync + std::fmt::Debug + 'static {
    /// Publish a batch of events in order.
    async fn publish(&self, events: Vec<DomainEvent>) -> AppResult<()>;
}
