//! `RouterActor` - the actor that owns all routing state.
//!
//! Single owner of the connection registry, the busy multiset, and the call
//! tracker; every mutation arrives as a message on its mailbox, so
//! interleaved connects, calls, and disconnects are serialized by ownership
//! rather than locks.
//!
//! Delivery is fire-and-forget, at-most-once: a directed event whose target
//! is unknown is dropped silently, and a full outbound buffer drops the
//! event rather than blocking the router. Per-recipient ordering is FIFO.

use crate::busy::BusyList;
use crate::calls::CallTracker;
use crate::errors::RouterError;
use crate::protocol::{ClientEvent, ConnectionId, ServerEvent};
use crate::registry::Registry;

use super::messages::{RouterMessage, RouterState};
use super::metrics::RouterMetrics;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Handle to the `RouterActor`.
#[derive(Clone)]
pub struct RouterActorHandle {
    sender: mpsc::Sender<RouterMessage>,
    cancel_token: CancellationToken,
}

impl RouterActorHandle {
    /// Announce an accepted connection and hand over its outbound channel.
    pub async fn connected(
        &self,
        connection_id: ConnectionId,
        sender: mpsc::Sender<ServerEvent>,
    ) -> Result<(), RouterError> {
        self.sender
            .send(RouterMessage::Connected {
                connection_id,
                sender,
            })
            .await
            .map_err(|e| RouterError::ChannelClosed(format!("router mailbox: {e}")))
    }

    /// Announce a closed connection.
    pub async fn disconnected(&self, connection_id: ConnectionId) -> Result<(), RouterError> {
        self.sender
            .send(RouterMessage::Disconnected { connection_id })
            .await
            .map_err(|e| RouterError::ChannelClosed(format!("router mailbox: {e}")))
    }

    /// Forward an inbound client event.
    pub async fn inbound(
        &self,
        connection_id: ConnectionId,
        event: ClientEvent,
    ) -> Result<(), RouterError> {
        self.sender
            .send(RouterMessage::Inbound {
                connection_id,
                event,
            })
            .await
            .map_err(|e| RouterError::ChannelClosed(format!("router mailbox: {e}")))
    }

    /// Get current router state.
    pub async fn state(&self) -> Result<RouterState, RouterError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(RouterMessage::GetState { respond_to: tx })
            .await
            .map_err(|e| RouterError::ChannelClosed(format!("router mailbox: {e}")))?;

        rx.await
            .map_err(|e| RouterError::ChannelClosed(format!("router response: {e}")))
    }

    /// Cancel the router actor.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Check if the actor is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Get a child token for dependent tasks.
    #[must_use]
    pub fn child_token(&self) -> CancellationToken {
        self.cancel_token.child_token()
    }
}

/// The `RouterActor` implementation.
pub struct RouterActor {
    /// Message receiver.
    receiver: mpsc::Receiver<RouterMessage>,
    /// Cancellation token.
    cancel_token: CancellationToken,
    /// Outbound channels for every live connection, registered or not.
    connections: HashMap<ConnectionId, mpsc::Sender<ServerEvent>>,
    /// Username <-> connection registry.
    registry: Registry,
    /// Busy multiset.
    busy: BusyList,
    /// Explicit call sessions.
    calls: CallTracker,
    /// Shared metrics.
    metrics: Arc<RouterMetrics>,
}

impl RouterActor {
    /// Spawn the router actor.
    ///
    /// Returns a handle and the task join handle.
    pub fn spawn(
        mailbox_capacity: usize,
        cancel_token: CancellationToken,
        metrics: Arc<RouterMetrics>,
    ) -> (RouterActorHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(mailbox_capacity);

        let actor = Self {
            receiver,
            cancel_token: cancel_token.clone(),
            connections: HashMap::new(),
            registry: Registry::new(),
            busy: BusyList::new(),
            calls: CallTracker::new(),
            metrics,
        };

        let task_handle = tokio::spawn(actor.run());

        let handle = RouterActorHandle {
            sender,
            cancel_token,
        };

        (handle, task_handle)
    }

    /// Run the actor message loop.
    #[instrument(skip_all, name = "sr.actor.router")]
    async fn run(mut self) {
        info!(target: "sr.actor.router", "RouterActor started");

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!(
                        target: "sr.actor.router",
                        connections = self.connections.len(),
                        "RouterActor received cancellation signal"
                    );
                    break;
                }

                msg = self.receiver.recv() => {
                    match msg {
                        Some(message) => self.handle_message(message),
                        None => {
                            info!(target: "sr.actor.router", "RouterActor channel closed, exiting");
                            break;
                        }
                    }
                }
            }
        }

        info!(
            target: "sr.actor.router",
            participants = self.registry.len(),
            "RouterActor stopped"
        );
    }

    /// Handle a single message.
    fn handle_message(&mut self, message: RouterMessage) {
        match message {
            RouterMessage::Connected {
                connection_id,
                sender,
            } => {
                debug!(
                    target: "sr.actor.router",
                    connection_id = %connection_id,
                    "Connection accepted"
                );
                self.connections.insert(connection_id, sender);
                self.metrics.connection_opened();
            }

            RouterMessage::Disconnected { connection_id } => {
                self.handle_disconnect(connection_id);
            }

            RouterMessage::Inbound {
                connection_id,
                event,
            } => {
                self.handle_event(connection_id, event);
            }

            RouterMessage::GetState { respond_to } => {
                let _ = respond_to.send(RouterState {
                    participants: self.registry.snapshot(),
                    busy: self.busy.snapshot(),
                    connection_count: self.connections.len(),
                    call_count: self.calls.len(),
                });
            }
        }
    }

    /// Dispatch one inbound event.
    #[allow(clippy::too_many_lines)] // one arm per protocol event
    fn handle_event(&mut self, connection_id: ConnectionId, event: ClientEvent) {
        match event {
            ClientEvent::JoinUser(username) => {
                info!(
                    target: "sr.actor.router",
                    connection_id = %connection_id,
                    username = %username,
                    "User joined"
                );
                self.registry.register(connection_id, username);
                self.broadcast(&ServerEvent::Joined(self.registry.snapshot()));
                self.send_to(connection_id, ServerEvent::Busy(self.busy.snapshot()));
            }

            ClientEvent::Offer { from, to, offer } => {
                debug!(target: "sr.actor.router", from = %from, to = %to, "Offer");
                self.send_to_username(&to.clone(), ServerEvent::Offer { from, to, offer });
            }

            ClientEvent::Answer { from, to, answer } => {
                debug!(target: "sr.actor.router", from = %from, to = %to, "Answer");
                self.send_to_username(&from.clone(), ServerEvent::Answer { from, to, answer });
            }

            ClientEvent::Call { from, to } => {
                info!(target: "sr.actor.router", from = %from, to = %to, "Call");
                self.busy.mark(&from);
                self.busy.mark(&to);
                self.calls.begin(&from, &to);
                self.send_to_username(&to.clone(), ServerEvent::Call { from, to });
                self.broadcast_busy();
            }

            ClientEvent::AcceptCall { from, to } => {
                info!(target: "sr.actor.router", from = %from, to = %to, "Call accepted");
                self.calls.accept(&from, &to);
                self.send_to_username(&from.clone(), ServerEvent::AcceptCall { from, to });
            }

            ClientEvent::RejectCall { from, to } => {
                info!(target: "sr.actor.router", from = %from, to = %to, "Call rejected");
                self.busy.unmark(&from);
                self.busy.unmark(&to);
                self.calls.end(&from, &to);
                self.send_to_username(&from.clone(), ServerEvent::RejectCall { from, to });
                self.broadcast_busy();
            }

            ClientEvent::CancelCall { from, to } => {
                info!(target: "sr.actor.router", from = %from, to = %to, "Call cancelled");
                self.busy.unmark(&from);
                self.busy.unmark(&to);
                self.calls.end(&from, &to);
                self.send_to_username(&to.clone(), ServerEvent::CancelCall { from, to });
                self.broadcast_busy();
            }

            ClientEvent::CallEnded { from, to } => {
                info!(target: "sr.actor.router", from = %from, to = %to, "Call ended");
                self.busy.unmark(&from);
                self.busy.unmark(&to);
                self.calls.end(&from, &to);
                self.send_to_username(
                    &to.clone(),
                    ServerEvent::CallEnded {
                        from: from.clone(),
                        to: to.clone(),
                    },
                );
                self.send_to_username(&from.clone(), ServerEvent::CallEnded { from, to });
                self.broadcast_busy();
            }

            ClientEvent::EndCall { from, to } => {
                // Notifies the peer to initiate the call-ended cleanup; no
                // busy mutation here.
                debug!(target: "sr.actor.router", from = %from, to = %to, "End call");
                self.send_to_username(&to.clone(), ServerEvent::EndCall { from, to });
            }

            ClientEvent::Camera { from, to } => {
                self.send_to_username(&from.clone(), ServerEvent::Camera { from, to });
            }

            ClientEvent::Audio { from, to } => {
                self.send_to_username(&from.clone(), ServerEvent::Audio { from, to });
            }

            ClientEvent::StartShareScreen { from, to } => {
                self.send_to_username(&from.clone(), ServerEvent::StartShareScreen { from, to });
            }

            ClientEvent::Icecandidate(candidate) => {
                self.broadcast_except(connection_id, &ServerEvent::Icecandidate(candidate));
            }

            ClientEvent::OfferChat { offer } => {
                self.broadcast_except(connection_id, &ServerEvent::OfferChat(offer));
            }

            ClientEvent::AnswerChat { answer } => {
                self.broadcast_except(connection_id, &ServerEvent::AnswerChat(answer));
            }

            ClientEvent::ChangeWhiteboard { to } => {
                debug!(target: "sr.actor.router", to = %to, "Whiteboard handoff");
                self.send_to_username(&to.clone(), ServerEvent::ChangeWhiteboard { to });
            }

            ClientEvent::StartWhiteboard { from } => {
                debug!(target: "sr.actor.router", from = %from, "Whiteboard start");
                self.send_to_username(&from.clone(), ServerEvent::StartWhiteboard { from });
            }
        }
    }

    /// Handle a transport disconnect: drop the connection, reconcile the
    /// registry, busy list, and any in-flight call.
    fn handle_disconnect(&mut self, connection_id: ConnectionId) {
        debug!(
            target: "sr.actor.router",
            connection_id = %connection_id,
            "Connection closed"
        );

        if self.connections.remove(&connection_id).is_some() {
            self.metrics.connection_closed();
        }

        let Some(participant) = self.registry.unregister(connection_id) else {
            return;
        };

        info!(
            target: "sr.actor.router",
            connection_id = %connection_id,
            username = %participant.username,
            remaining = self.registry.len(),
            "Participant left"
        );

        self.broadcast(&ServerEvent::Joined(self.registry.snapshot()));

        // A counterpart whose peer drops mid-call gets a synthetic
        // call-ended so its client can run the normal teardown path instead
        // of waiting on a ghost.
        if let Some(session) = self.calls.take_for_user(&participant.username) {
            let counterpart = if session.caller == participant.username {
                session.callee.clone()
            } else {
                session.caller.clone()
            };
            warn!(
                target: "sr.actor.router",
                username = %participant.username,
                counterpart = %counterpart,
                "Participant disconnected mid-call, notifying counterpart"
            );
            self.send_to_username(
                &counterpart,
                ServerEvent::CallEnded {
                    from: session.caller,
                    to: session.callee,
                },
            );
        }

        self.busy.unmark(&participant.username);
        self.broadcast_busy();
    }

    /// Deliver an event to one connection. Fire-and-forget: a full buffer
    /// drops the event.
    fn send_to(&self, connection_id: ConnectionId, event: ServerEvent) {
        let Some(sender) = self.connections.get(&connection_id) else {
            self.metrics.event_dropped();
            return;
        };

        match sender.try_send(event) {
            Ok(()) => self.metrics.event_routed(),
            Err(e) => {
                debug!(
                    target: "sr.actor.router",
                    connection_id = %connection_id,
                    error = %e,
                    "Dropping event for slow or closed connection"
                );
                self.metrics.event_dropped();
            }
        }
    }

    /// Deliver an event to the first connection registered under `username`.
    /// Unknown targets are dropped silently.
    fn send_to_username(&self, username: &str, event: ServerEvent) {
        match self.registry.lookup(username) {
            Some(connection_id) => self.send_to(connection_id, event),
            None => {
                debug!(
                    target: "sr.actor.router",
                    username = %username,
                    "Dropping event for unknown target"
                );
                self.metrics.event_dropped();
            }
        }
    }

    /// Deliver an event to every live connection.
    fn broadcast(&self, event: &ServerEvent) {
        for connection_id in self.connections.keys() {
            self.send_to(*connection_id, event.clone());
        }
    }

    /// Deliver an event to every live connection except the originator.
    fn broadcast_except(&self, except: ConnectionId, event: &ServerEvent) {
        for connection_id in self.connections.keys() {
            if *connection_id != except {
                self.send_to(*connection_id, event.clone());
            }
        }
    }

    /// Broadcast the current busy snapshot, the final step of every handler
    /// that mutates the busy list.
    fn broadcast_busy(&self) {
        self.broadcast(&ServerEvent::Busy(self.busy.snapshot()));
    }
}
