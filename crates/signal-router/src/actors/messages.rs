//! Message types for the router actor mailbox.
//!
//! All communication with the router uses strongly-typed message passing via
//! `tokio::sync::mpsc`; request-reply uses `tokio::sync::oneshot`.

use crate::protocol::{ClientEvent, ConnectionId, ParticipantInfo, ServerEvent};
use tokio::sync::{mpsc, oneshot};

/// Messages sent to the `RouterActor`.
#[derive(Debug)]
pub enum RouterMessage {
    /// A transport connection was accepted. The sender is the connection's
    /// outbound channel; the router owns the only clones.
    Connected {
        connection_id: ConnectionId,
        sender: mpsc::Sender<ServerEvent>,
    },

    /// A transport connection closed.
    Disconnected { connection_id: ConnectionId },

    /// An inbound event arrived on a connection.
    Inbound {
        connection_id: ConnectionId,
        event: ClientEvent,
    },

    /// Get current router state (for health and tests).
    GetState {
        respond_to: oneshot::Sender<RouterState>,
    },
}

/// Snapshot of router state.
#[derive(Debug, Clone)]
pub struct RouterState {
    /// Registered participants in insertion order.
    pub participants: Vec<ParticipantInfo>,
    /// Busy multiset contents.
    pub busy: Vec<String>,
    /// Live transport connections (registered or not).
    pub connection_count: usize,
    /// In-flight call sessions.
    pub call_count: usize,
}
