//! Wire protocol for the signaling channel.
//!
//! Frames are JSON objects of the form `{"event": <name>, "data": <payload>}`,
//! expressed as adjacently tagged enums. Event names are kebab-case and match
//! the client protocol exactly; `from`/`to` fields are relayed as received and
//! never rewritten by the router.
//!
//! Inbound and outbound surfaces differ slightly: `offer-chat` and
//! `answer-chat` arrive wrapped (`{"offer": ...}`) but are broadcast with the
//! payload unwrapped, and `joined`/`busy` exist only outbound.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Opaque handle to one live client connection.
///
/// Minted by the transport layer when a socket is accepted; the core never
/// duplicates or fabricates these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Mint a fresh connection ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One entry of the presence list broadcast in `joined` frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInfo {
    /// Connection the username is bound to.
    #[serde(rename = "id")]
    pub connection_id: ConnectionId,
    /// Claimed username. Uniqueness is not enforced.
    pub username: String,
}

/// Events received from clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Claim a username for this connection.
    JoinUser(String),
    /// SDP offer, directed to `to`.
    Offer { from: String, to: String, offer: Value },
    /// SDP answer, directed back to `from`.
    Answer {
        from: String,
        to: String,
        answer: Value,
    },
    /// Call invitation. Marks both parties busy.
    Call { from: String, to: String },
    /// Callee accepted; directed to `from`.
    AcceptCall { from: String, to: String },
    /// Callee rejected; clears busy, directed to `from`.
    RejectCall { from: String, to: String },
    /// Caller cancelled before answer; clears busy, directed to `to`.
    CancelCall { from: String, to: String },
    /// Call teardown complete; clears busy, directed to both parties.
    CallEnded { from: String, to: String },
    /// Ask the peer to initiate teardown. No busy effect.
    EndCall { from: String, to: String },
    /// Camera toggle notice, directed to `from`.
    Camera { from: String, to: String },
    /// Audio toggle notice, directed to `from`.
    Audio { from: String, to: String },
    /// Screen-share start notice, directed to `from`.
    StartShareScreen { from: String, to: String },
    /// ICE candidate, broadcast to everyone but the sender.
    Icecandidate(Value),
    /// Chat-channel offer, broadcast-except-sender with the payload unwrapped.
    OfferChat { offer: Value },
    /// Chat-channel answer, broadcast-except-sender with the payload unwrapped.
    AnswerChat { answer: Value },
    /// Whiteboard handoff, directed to `to`.
    ChangeWhiteboard { to: String },
    /// Whiteboard session start, directed to `from`.
    StartWhiteboard { from: String },
}

/// Events delivered to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Full presence list, broadcast after every registry mutation.
    Joined(Vec<ParticipantInfo>),
    /// Full busy snapshot, broadcast after every busy mutation.
    Busy(Vec<String>),
    Offer {
        from: String,
        to: String,
        offer: Value,
    },
    Answer {
        from: String,
        to: String,
        answer: Value,
    },
    Call { from: String, to: String },
    AcceptCall { from: String, to: String },
    RejectCall { from: String, to: String },
    CancelCall { from: String, to: String },
    CallEnded { from: String, to: String },
    EndCall { from: String, to: String },
    Camera { from: String, to: String },
    Audio { from: String, to: String },
    StartShareScreen { from: String, to: String },
    Icecandidate(Value),
    /// Unwrapped chat offer payload.
    OfferChat(Value),
    /// Unwrapped chat answer payload.
    AnswerChat(Value),
    ChangeWhiteboard { to: String },
    StartWhiteboard { from: String },
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_join_user_wire_shape() {
        let frame = json!({"event": "join-user", "data": "alice"});
        let event: ClientEvent = serde_json::from_value(frame).unwrap();
        assert_eq!(event, ClientEvent::JoinUser("alice".to_string()));
    }

    #[test]
    fn test_offer_round_trips_payload_untouched() {
        let frame = json!({
            "event": "offer",
            "data": {"from": "alice", "to": "bob", "offer": {"type": "offer", "sdp": "v=0"}}
        });
        let event: ClientEvent = serde_json::from_value(frame.clone()).unwrap();
        match &event {
            ClientEvent::Offer { from, to, offer } => {
                assert_eq!(from, "alice");
                assert_eq!(to, "bob");
                assert_eq!(offer["sdp"], "v=0");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_call_lifecycle_event_names() {
        for (name, expected) in [
            ("call", ClientEvent::Call { from: "a".into(), to: "b".into() }),
            (
                "accept-call",
                ClientEvent::AcceptCall { from: "a".into(), to: "b".into() },
            ),
            (
                "reject-call",
                ClientEvent::RejectCall { from: "a".into(), to: "b".into() },
            ),
            (
                "cancel-call",
                ClientEvent::CancelCall { from: "a".into(), to: "b".into() },
            ),
            (
                "call-ended",
                ClientEvent::CallEnded { from: "a".into(), to: "b".into() },
            ),
            (
                "end-call",
                ClientEvent::EndCall { from: "a".into(), to: "b".into() },
            ),
        ] {
            let frame = json!({"event": name, "data": {"from": "a", "to": "b"}});
            let event: ClientEvent = serde_json::from_value(frame).unwrap();
            assert_eq!(event, expected, "event name {name}");
        }
    }

    #[test]
    fn test_start_share_screen_event_name() {
        let event = ServerEvent::StartShareScreen {
            from: "alice".to_string(),
            to: "bob".to_string(),
        };
        let frame = serde_json::to_value(&event).unwrap();
        assert_eq!(frame["event"], "start-share-screen");
    }

    #[test]
    fn test_icecandidate_carries_arbitrary_payload() {
        let frame = json!({"event": "icecandidate", "data": {"candidate": "xyz", "sdpMid": "0"}});
        let event: ClientEvent = serde_json::from_value(frame).unwrap();
        assert!(matches!(event, ClientEvent::Icecandidate(_)));
    }

    #[test]
    fn test_offer_chat_unwrapped_outbound() {
        // Inbound arrives wrapped.
        let frame = json!({"event": "offer-chat", "data": {"offer": {"sdp": "chat"}}});
        let event: ClientEvent = serde_json::from_value(frame).unwrap();
        let ClientEvent::OfferChat { offer } = event else {
            panic!("expected offer-chat");
        };

        // Outbound is the bare payload.
        let out = serde_json::to_value(&ServerEvent::OfferChat(offer)).unwrap();
        assert_eq!(out, json!({"event": "offer-chat", "data": {"sdp": "chat"}}));
    }

    #[test]
    fn test_joined_snapshot_shape() {
        let id = ConnectionId::new();
        let event = ServerEvent::Joined(vec![ParticipantInfo {
            connection_id: id,
            username: "alice".to_string(),
        }]);
        let frame = serde_json::to_value(&event).unwrap();
        assert_eq!(frame["event"], "joined");
        assert_eq!(frame["data"][0]["username"], "alice");
        assert_eq!(frame["data"][0]["id"], id.to_string());
    }

    #[test]
    fn test_busy_snapshot_shape() {
        let event = ServerEvent::Busy(vec!["alice".to_string(), "bob".to_string()]);
        let frame = serde_json::to_value(&event).unwrap();
        assert_eq!(frame, json!({"event": "busy", "data": ["alice", "bob"]}));
    }

    #[test]
    fn test_malformed_frame_is_rejected() {
        let result = serde_json::from_str::<ClientEvent>(r#"{"event": "call"}"#);
        assert!(result.is_err());

        let result = serde_json::from_str::<ClientEvent>(r#"{"event": "no-such-event", "data": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_connection_id_display_matches_serde() {
        let id = ConnectionId::new();
        let serialized = serde_json::to_value(id).unwrap();
        assert_eq!(serialized, Value::String(id.to_string()));
    }
}
