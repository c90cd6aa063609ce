//! Signal Router error types.
//!
//! The routing surface itself has no error channel: an unresolved target or
//! malformed frame is dropped, logged, and counted, never surfaced
//! to the offending connection or allowed to take down unrelated sessions.
//! These types cover the remaining fallible seams: configuration and actor
//! channel plumbing.

use thiserror::Error;

/// Signal Router error type.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Actor mailbox or response channel closed.
    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}
