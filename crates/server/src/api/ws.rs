//! WebSocket support for real-time dashboard updates.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use doorman_core::{ScanState, StatusCounts};

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// WebSocket message sent to clients for real-time updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// The scanner moved to a new state.
    ScanUpdate { state: ScanState },
    /// Registry counts changed (sent after a ticket is consumed).
    RegistryUpdate {
        available: u64,
        sold: u64,
        used: u64,
        total: u64,
    },
    /// Server heartbeat (sent periodically to keep connection alive).
    Heartbeat { timestamp: i64 },
}

/// Broadcaster for WebSocket messages using tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct WsBroadcaster {
    sender: broadcast::Sender<WsMessage>,
}

impl WsBroadcaster {
    /// Create a new broadcaster with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcast a message to all connected clients.
    pub fn broadcast(&self, msg: WsMessage) {
        // Ignore send errors - they just mean no one is listening
        let _ = self.sender.send(msg);
    }

    /// Subscribe to receive messages.
    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.sender.subscribe()
    }

    /// Convenience method to broadcast a scanner state change.
    pub fn scan_update(&self, state: ScanState) {
        self.broadcast(WsMessage::ScanUpdate { state });
    }

    /// Convenience method to broadcast fresh registry counts.
    pub fn registry_update(&self, counts: StatusCounts) {
        self.broadcast(WsMessage::RegistryUpdate {
            available: counts.available,
            sold: counts.sold,
            used: counts.used,
            total: counts.total(),
        });
    }

    /// Convenience method to broadcast a heartbeat with the current time.
    pub fn heartbeat(&self) {
        self.broadcast(WsMessage::Heartbeat {
            timestamp: chrono::Utc::now().timestamp(),
        });
    }
}

impl Default for WsBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe to broadcast messages
    let mut rx = state.ws_broadcaster().subscribe();

    // Track connection metrics
    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("WebSocket client connected");

    // Spawn task to forward broadcast messages to this client
    let send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                // Forward broadcast messages to client
                result = rx.recv() => {
                    match result {
                        Ok(msg) => {
                            // Track message by type
                            let msg_type = match &msg {
                                WsMessage::ScanUpdate { .. } => "scan_update",
                                WsMessage::RegistryUpdate { .. } => "registry_update",
                                WsMessage::Heartbeat { .. } => "heartbeat",
                            };
                            WS_MESSAGES_SENT.with_label_values(&[msg_type]).inc();

                            match serde_json::to_string(&msg) {
                                Ok(json) => {
                                    if sender.send(Message::Text(json.into())).await.is_err() {
                                        debug!("WebSocket send failed, client disconnected");
                                        break;
                                    }
                                }
                                Err(e) => {
                                    error!("Failed to serialize WsMessage: {}", e);
                                }
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!("WebSocket client lagged, skipped {} messages", n);
                            WS_LAG_EVENTS.inc();
                            // Continue receiving - the client will catch up
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            debug!("Broadcast channel closed");
                            break;
                        }
                    }
                }
            }
        }
    });

    // Handle incoming messages from client (ping/pong, close)
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Ping(data)) => {
                // Pong is handled automatically by axum
                debug!("Received ping: {:?}", data);
            }
            Ok(Message::Text(text)) => {
                // We don't expect any client messages, but log them
                debug!("Received text message: {}", text);
            }
            Ok(_) => {
                // Ignore other message types
            }
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    // Clean up
    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_update_serialization() {
        let msg = WsMessage::ScanUpdate {
            state: ScanState::Processing {
                code: "VIP-GALA-001".to_string(),
            },
        };

        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "scan_update");
        assert_eq!(json["state"]["type"], "processing");
        assert_eq!(json["state"]["code"], "VIP-GALA-001");
    }

    #[test]
    fn test_registry_update_carries_totals() {
        let broadcaster = WsBroadcaster::new(8);
        let mut rx = broadcaster.subscribe();

        let counts = StatusCounts {
            available: 2,
            sold: 4,
            used: 2,
        };
        broadcaster.registry_update(counts);

        match rx.try_recv().unwrap() {
            WsMessage::RegistryUpdate { total, sold, .. } => {
                assert_eq!(total, 8);
                assert_eq!(sold, 4);
            }
            other => panic!("Expected registry update, got {:?}", other),
        }
    }
}
