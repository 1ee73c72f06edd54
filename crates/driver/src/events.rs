//! Event Bus - lifecycle notifications for sessions and finds
//!
//! Fire and forget. Nobody listening is fine.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::protocol::{ElementId, SessionId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DriverEvent {
    SessionCreated { session_id: SessionId },
    SessionDeleted { session_id: SessionId },
    ImplicitWaitChanged { session_id: SessionId, millis: u64 },
    ElementsFound { session_id: SessionId, element_ids: Vec<ElementId> },
}

/// Event bus using tokio broadcast channel
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DriverEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1024);
        Self { tx }
    }

    pub fn publish(&self, event: DriverEvent) {
        let _ = self.tx.send(event); // Ignore error if no subscribers
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DriverEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
