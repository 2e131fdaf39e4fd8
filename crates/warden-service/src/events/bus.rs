//! In-process event bus on a tokio broadcast channel.

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use warden_core::events::DomainEvent;
use warden_core::result::AppResult;
use warden_core::traits::EventBus;

/// Broadcasts every published event to all current subscribers.
///
/// Sending never waits: a subscriber that falls more than the channel
/// capacity behind loses the oldest events.
#[derive(Debug, Clone)]
pub struct BroadcastEventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl BroadcastEventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl EventBus for BroadcastEventBus {
    async fn publish(&self, events: Vec<DomainEvent>) -> AppResult<()> {
        for event in events {
            let name = event.name();
            if self.tx.send(event).is_err() {
                debug!(event = name, "No subscribers for event");
            }
        }
        Ok(())
    }
}

/// Writes every event on the bus to the log.
#[derive(Debug)]
pub struct EventLogger {
    rx: broadcast::Receiver<DomainEvent>,
}

impl EventLogger {
    /// Subscribe a logger to the bus.
    pub fn new(bus: &BroadcastEventBus) -> Self {
        Self { rx: bus.subscribe() }
    }

    /// Log events until the cancel signal is received or the bus is dropped.
    pub async fn run(mut self, mut cancel: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        break;
                    }
                }
                received = self.rx.recv() => match received {
                    Ok(event) => info!(
                        event = event.name(),
                        event_id = %event.id,
                        actor_id = ?event.actor_id,
                        "Domain event"
                    ),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Event logger lagged behind");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    }
}
