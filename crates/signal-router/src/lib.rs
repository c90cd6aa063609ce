//! Signal Router Service Library
//!
//! A real-time signaling router for peer-to-peer call setup. It relays the
//! control messages (offers, answers, call invitations, termination,
//! media-toggle notices, whiteboard handoffs) that let two named
//! participants establish a direct channel elsewhere; it never carries media
//! or document content itself.
//!
//! # Architecture
//!
//! All routing state is owned by a single actor:
//!
//! ```text
//! RouterActor (singleton)
//! ├── Registry      username <-> connection mapping (insertion-ordered)
//! ├── BusyList      multiset of usernames in a call lifecycle
//! └── CallTracker   explicit per-pair call sessions
//! ```
//!
//! WebSocket connections are transport adapters: each socket forwards parsed
//! inbound events to the actor and drains an outbound channel the actor
//! delivers into. Delivery is fire-and-forget, at-most-once, per-recipient
//! FIFO.
//!
//! # Key Design Decisions
//!
//! - **Serialization by ownership**: registry/busy/call state lives in one
//!   task; no locks, no interleaved mutation.
//! - **Best-effort relay**: unresolved targets and malformed frames are
//!   dropped and counted, never errors, never fatal.
//! - **Permissive call tracking**: lifecycle events route without
//!   precondition checks; the tracker records what it can.
//! - **First-match username lookup**: duplicate registrations are allowed
//!   and resolve to the earliest entry.
//!
//! # Modules
//!
//! - [`actors`] - Router actor, mailbox messages, metrics
//! - [`busy`] - Busy multiset
//! - [`calls`] - Call session tracker
//! - [`config`] - Service configuration from environment
//! - [`errors`] - Error types
//! - [`observability`] - Health endpoints
//! - [`protocol`] - Wire events
//! - [`registry`] - Connection registry
//! - [`ws`] - WebSocket transport adapter

pub mod actors;
pub mod busy;
pub mod calls;
pub mod config;
pub mod errors;
pub mod observability;
pub mod protocol;
pub mod registry;
pub mod ws;
