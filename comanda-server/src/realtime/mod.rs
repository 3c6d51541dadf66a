//! Realtime fan-out
//!
//! Order lifecycle events go out through an injected [`EventBroadcaster`]
//! so the orchestration layer never touches the transport directly. The
//! production implementation rides on Socket.IO rooms; tests use the
//! in-memory broadcaster and subscribe to a channel instead.

pub mod memory;
pub mod socketio;

pub use memory::MemoryBroadcaster;
pub use socketio::SocketIoBroadcaster;

use async_trait::async_trait;
use serde_json::Value;
use shared::events::{OrderEventKind, Room};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("broadcast transport error: {0}")]
    Transport(String),
}

/// Role-scoped event fan-out. Delivery is at-most-once and best
/// effort; callers must never let a failure here poison committed
/// state.
#[async_trait]
pub trait EventBroadcaster: Send + Sync {
    /// Emit to every client in one room
    async fn publish(
        &self,
        room: Room,
        kind: OrderEventKind,
        payload: Value,
    ) -> Result<(), BroadcastError>;

    /// Emit to all connected clients regardless of room
    async fn broadcast(&self, kind: OrderEventKind, payload: Value) -> Result<(), BroadcastError>;
}
