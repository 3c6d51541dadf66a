//! Socket.IO transport. Clients join role rooms ("kitchen", "waiter",
//! "admin") by emitting `join_room`; order events are emitted into
//! those rooms by the [`SocketIoBroadcaster`].

use super::{BroadcastError, EventBroadcaster};
use async_trait::async_trait;
use serde_json::Value;
use shared::events::{OrderEventKind, Room};
use socketioxide::extract::{Data, SocketRef};
use socketioxide::SocketIo;
use tracing::{debug, warn};

pub struct SocketIoBroadcaster {
    io: SocketIo,
}

impl SocketIoBroadcaster {
    pub fn new(io: SocketIo) -> Self {
        Self { io }
    }

    /// Register the connection handler on the root namespace.
    pub fn attach_handlers(io: &SocketIo) {
        let _ = io.ns("/", on_connect);
    }
}

async fn on_connect(socket: SocketRef) {
    debug!(sid = %socket.id, "socket connected");

    socket.on("join_room", |socket: SocketRef, Data::<String>(name)| async move {
        match name.parse::<Room>() {
            Ok(room) => {
                let _ = socket.join(room.as_str());
                debug!(sid = %socket.id, room = room.as_str(), "joined room");
            }
            Err(_) => {
                warn!(sid = %socket.id, room = %name, "rejected unknown room");
            }
        }
    });

    socket.on("leave_room", |socket: SocketRef, Data::<String>(name)| async move {
        if let Ok(room) = name.parse::<Room>() {
            let _ = socket.leave(room.as_str());
            debug!(sid = %socket.id, room = room.as_str(), "left room");
        }
    });

    socket.on_disconnect(|socket: SocketRef| async move {
        debug!(sid = %socket.id, "socket disconnected");
    });
}

#[async_trait]
impl EventBroadcaster for SocketIoBroadcaster {
    async fn publish(
        &self,
        room: Room,
        kind: OrderEventKind,
        payload: Value,
    ) -> Result<(), BroadcastError> {
        self.io
            .to(room.as_str())
            .emit(kind.as_str(), &payload)
            .await
            .map_err(|e| BroadcastError::Transport(e.to_string()))
    }

    async fn broadcast(&self, kind: OrderEventKind, payload: Value) -> Result<(), BroadcastError> {
        self.io
            .emit(kind.as_str(), &payload)
            .await
            .map_err(|e| BroadcastError::Transport(e.to_string()))
    }
}
