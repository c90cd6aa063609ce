//! Actor model implementation.
//!
//! A single `RouterActor` owns all mutable routing state (registry, busy
//! list, call sessions) and serializes every mutation through its mailbox.
//! Transport connections talk to it only through `RouterActorHandle`.

mod messages;
mod metrics;
mod router;

pub use messages::{RouterMessage, RouterState};
pub use metrics::{MetricsSnapshot, RouterMetrics};
pub use router::{RouterActor, RouterActorHandle};
