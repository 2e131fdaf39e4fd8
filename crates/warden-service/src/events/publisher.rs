//! Best-effort event publication used by the command handlers.

use std::sync::Arc;

use tracing::warn;

use warden_core::events::{AuthEvent, DomainEvent};
use warden_core::traits::EventBus;

/// Publishes events and swallows failures.
///
/// The primary operation has already succeeded when an event is published,
/// so a failing bus is logged and never reaches the caller.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    bus: Arc<dyn EventBus>,
}

impl EventPublisher {
    /// Create a publisher over the given bus.
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self { bus }
    }

    /// Publish one event.
    pub async fn publish(&self, event: AuthEvent) {
        let event = DomainEvent::from(event);
        let name = event.name();
        if let Err(e) = self.bus.publish(vec![event]).await {
            warn!(event = name, error = %e, "Failed to publish domain event");
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use uuid::Uuid;
    use warden_core::error::AppError;
    use warden_core::result::AppResult;

    use super::*;

    #[derive(Debug)]
    struct BrokenBus;

    #[async_trait]
    impl EventBus for BrokenBus {
        async fn publish(&self, _events: Vec<DomainEvent>) -> AppResult<()> {
            Err(AppError::service_unavailable("bus down"))
        }
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let publisher = EventPublisher::new(Arc::new(BrokenBus));
        publisher
            .publish(AuthEvent::UserRegistered {
                user_id: Uuid::new_v4(),
                email: "a@example.com".into(),
            })
            .await;
    }
}
