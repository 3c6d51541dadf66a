//! In-memory broadcaster backed by a tokio broadcast channel. Used by
//! tests and by deployments that run without a Socket.IO frontend.

use super::{BroadcastError, EventBroadcaster};
use async_trait::async_trait;
use serde_json::Value;
use shared::events::{OrderEventKind, Room};
use tokio::sync::broadcast;

#[derive(Debug, Clone)]
pub struct BroadcastedEvent {
    /// `None` means the event went to every connected client
    pub room: Option<Room>,
    pub kind: OrderEventKind,
    pub payload: Value,
}

pub struct MemoryBroadcaster {
    tx: broadcast::Sender<BroadcastedEvent>,
}

impl MemoryBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastedEvent> {
        self.tx.subscribe()
    }
}

impl Default for MemoryBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EventBroadcaster for MemoryBroadcaster {
    async fn publish(
        &self,
        room: Room,
        kind: OrderEventKind,
        payload: Value,
    ) -> Result<(), BroadcastError> {
        // No subscribers is not an error, events are fire-and-forget.
        let _ = self.tx.send(BroadcastedEvent {
            room: Some(room),
            kind,
            payload,
        });
        Ok(())
    }

    async fn broadcast(&self, kind: OrderEventKind, payload: Value) -> Result<(), BroadcastError> {
        let _ = self.tx.send(BroadcastedEvent {
            room: None,
            kind,
            payload,
        });
        Ok(())
    }
}
