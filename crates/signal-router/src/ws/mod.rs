//! WebSocket transport adapter.
//!
//! `GET /ws` upgrades to a WebSocket carrying JSON signaling frames. Each
//! socket gets a fresh `ConnectionId` and an outbound channel handed to the
//! router actor; a writer task drains that channel to the wire while the
//! reader loop parses inbound frames and forwards them.
//!
//! Malformed frames are dropped per-connection with a warning so one
//! misbehaving client cannot affect unrelated sessions. The writer exits
//! when the router drops the outbound sender after disconnect.

use crate::actors::{RouterActorHandle, RouterMetrics};
use crate::protocol::{ClientEvent, ConnectionId};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Shared state for the WebSocket route.
#[derive(Clone)]
pub struct WsState {
    /// Handle to the router actor.
    pub router: RouterActorHandle,
    /// Shared metrics (malformed-frame counting).
    pub metrics: Arc<RouterMetrics>,
    /// Per-connection outbound buffer capacity.
    pub connection_buffer: usize,
}

/// Create the WebSocket router.
pub fn ws_router(state: WsState) -> Router {
    Router::new().route("/ws", get(ws_handler)).with_state(state)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WsState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one client connection until it closes.
async fn handle_socket(socket: WebSocket, state: WsState) {
    let connection_id = ConnectionId::new();
    let (outbound_tx, mut outbound_rx) = mpsc::channel(state.connection_buffer);

    if state
        .router
        .connected(connection_id, outbound_tx)
        .await
        .is_err()
    {
        // Router is shutting down; refuse the connection quietly.
        return;
    }

    debug!(target: "sr.ws", connection_id = %connection_id, "WebSocket connected");

    let (mut sink, mut stream) = socket.split();

    // Writer: drain outbound events to the wire. Ends when the router drops
    // the sender or the socket errors.
    let writer = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let frame = match serde_json::to_string(&event) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(target: "sr.ws", error = %e, "Failed to serialize outbound event");
                    continue;
                }
            };
            if sink.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    // Reader: parse inbound frames and forward to the router.
    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => {
                    if state.router.inbound(connection_id, event).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(
                        target: "sr.ws",
                        connection_id = %connection_id,
                        error = %e,
                        "Dropping malformed frame"
                    );
                    state.metrics.payload_rejected();
                }
            },
            Ok(Message::Close(_)) => break,
            // Ping/pong are handled by the protocol layer; binary frames are
            // not part of the signaling protocol.
            Ok(_) => {}
            Err(e) => {
                debug!(
                    target: "sr.ws",
                    connection_id = %connection_id,
                    error = %e,
                    "WebSocket read error"
                );
                break;
            }
        }
    }

    if let Err(e) = state.router.disconnected(connection_id).await {
        debug!(
            target: "sr.ws",
            connection_id = %connection_id,
            error = %e,
            "Router unavailable during disconnect"
        );
    }

    // The router dropping the outbound sender terminates the writer.
    let _ = writer.await;

    debug!(target: "sr.ws", connection_id = %connection_id, "WebSocket closed");
}
