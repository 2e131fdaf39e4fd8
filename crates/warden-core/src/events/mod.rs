//! Domain events emitted by the authentication core.
//!
//! Events are published best-effort through an [`EventBus`](crate::traits::EventBus)
//! after the primary operation has succeeded; they are immutable once created.

pub mod auth;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use auth::AuthEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The user who caused the event (if known).
    pub actor_id: Option<Uuid>,
    /// The event payload.
    pub payload: AuthEvent,
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor_id: Option<Uuid>, payload: AuthEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }

    /// Short event name, e.g. `"UserLoggedIn"`.
    pub fn name(&self) -> &'static str {
        self.payload.name()
    }
}

impl From<AuthEvent> for DomainEvent {
    fn from(payload: AuthEvent) -> Self {
        let actor_id = payload.user_id();
        Self::new(actor_id, payload)
    }
}
