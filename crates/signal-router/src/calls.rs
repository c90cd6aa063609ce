//! Call session tracker.
//!
//! Each call attempt is an explicit session keyed by the unordered username
//! pair, rather than being implied by busy-list membership, so that removals
//! match the correct call when a user has multiple concurrent attempts.
//!
//! The tracker is bookkeeping, not a validator: no transition is rejected.
//! An `accept-call` with no matching `call` still routes; the tracker simply
//! has nothing to record.

/// Lifecycle state of a call attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    /// Invitation sent, awaiting accept/reject/cancel.
    Ringing,
    /// Invitation accepted, call in progress.
    Active,
}

/// An in-flight call attempt between two participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSession {
    /// Username that initiated the call.
    pub caller: String,
    /// Username that was invited.
    pub callee: String,
    /// Current lifecycle state.
    pub state: CallState,
}

impl CallSession {
    fn matches_pair(&self, a: &str, b: &str) -> bool {
        (self.caller == a && self.callee == b) || (self.caller == b && self.callee == a)
    }

    fn involves(&self, username: &str) -> bool {
        self.caller == username || self.callee == username
    }
}

/// Ordered collection of in-flight call sessions.
#[derive(Debug, Default)]
pub struct CallTracker {
    sessions: Vec<CallSession>,
}

impl CallTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Vec::new(),
        }
    }

    /// Record a new ringing attempt from `caller` to `callee`.
    pub fn begin(&mut self, caller: &str, callee: &str) {
        self.sessions.push(CallSession {
            caller: caller.to_string(),
            callee: callee.to_string(),
            state: CallState::Ringing,
        });
    }

    /// Mark the first ringing session for this pair as active. No-op when no
    /// such session exists.
    pub fn accept(&mut self, from: &str, to: &str) {
        if let Some(session) = self
            .sessions
            .iter_mut()
            .find(|s| s.state == CallState::Ringing && s.matches_pair(from, to))
        {
            session.state = CallState::Active;
        }
    }

    /// Remove the first session for this pair (any state), returning it.
    /// No-op when no session matches.
    pub fn end(&mut self, from: &str, to: &str) -> Option<CallSession> {
        let index = self.sessions.iter().position(|s| s.matches_pair(from, to))?;
        Some(self.sessions.remove(index))
    }

    /// Remove and return the first session involving `username`, for
    /// disconnect reconciliation.
    pub fn take_for_user(&mut self, username: &str) -> Option<CallSession> {
        let index = self.sessions.iter().position(|s| s.involves(username))?;
        Some(self.sessions.remove(index))
    }

    /// Number of in-flight sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions are in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_and_accept() {
        let mut calls = CallTracker::new();
        calls.begin("alice", "bob");
        assert_eq!(calls.len(), 1);

        // Accept arrives with the pair reversed relative to the invite.
        calls.accept("alice", "bob");
        let session = calls.end("bob", "alice").unwrap();
        assert_eq!(session.state, CallState::Active);
        assert_eq!(session.caller, "alice");
    }

    #[test]
    fn test_end_matches_unordered_pair() {
        let mut calls = CallTracker::new();
        calls.begin("alice", "bob");

        assert!(calls.end("bob", "alice").is_some());
        assert!(calls.is_empty());
    }

    #[test]
    fn test_accept_without_invite_is_noop() {
        let mut calls = CallTracker::new();
        calls.accept("alice", "bob");
        assert!(calls.is_empty());
    }

    #[test]
    fn test_end_without_session_is_noop() {
        let mut calls = CallTracker::new();
        assert!(calls.end("alice", "bob").is_none());
    }

    #[test]
    fn test_concurrent_attempts_resolve_to_correct_pair() {
        let mut calls = CallTracker::new();
        calls.begin("alice", "bob");
        calls.begin("carol", "bob");

        // Ending carol<->bob leaves the alice<->bob attempt untouched.
        let ended = calls.end("bob", "carol").unwrap();
        assert_eq!(ended.caller, "carol");
        assert_eq!(calls.len(), 1);

        let remaining = calls.take_for_user("bob").unwrap();
        assert_eq!(remaining.caller, "alice");
    }

    #[test]
    fn test_take_for_user() {
        let mut calls = CallTracker::new();
        calls.begin("alice", "bob");

        let session = calls.take_for_user("bob").unwrap();
        assert_eq!(session.caller, "alice");
        assert_eq!(session.callee, "bob");
        assert!(calls.is_empty());

        assert!(calls.take_for_user("bob").is_none());
    }
}
