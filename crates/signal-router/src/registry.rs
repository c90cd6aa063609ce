//! Connection registry: the bidirectional mapping between live connections
//! and claimed usernames.
//!
//! Single source of truth for "who is online and where". Entries are kept in
//! insertion order because the lookup policy under duplicate usernames is
//! first-match: two connections may claim the same username, and directed
//! routing resolves to whichever registered first. Registration performs no
//! uniqueness check.

use crate::protocol::{ConnectionId, ParticipantInfo};

/// A connection bound to a claimed username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Transport connection handle.
    pub connection_id: ConnectionId,
    /// Claimed username (unauthenticated).
    pub username: String,
}

/// Insertion-ordered registry of participants.
///
/// Mutated only by [`Registry::register`] (append) and
/// [`Registry::unregister`] (remove by connection); read by every routing
/// operation. Entries live exactly as long as their connection.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<Participant>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a participant. Duplicate usernames are allowed; later lookups
    /// for a duplicated name resolve to the earliest entry.
    pub fn register(&mut self, connection_id: ConnectionId, username: String) {
        self.entries.push(Participant {
            connection_id,
            username,
        });
    }

    /// Resolve a username to its connection (first match in insertion order).
    ///
    /// A miss is not an error: callers drop the message, matching the relay's
    /// best-effort delivery model.
    #[must_use]
    pub fn lookup(&self, username: &str) -> Option<ConnectionId> {
        self.entries
            .iter()
            .find(|p| p.username == username)
            .map(|p| p.connection_id)
    }

    /// Remove the participant bound to this connection, if any, returning it
    /// for cleanup cascades.
    pub fn unregister(&mut self, connection_id: ConnectionId) -> Option<Participant> {
        let index = self
            .entries
            .iter()
            .position(|p| p.connection_id == connection_id)?;
        Some(self.entries.remove(index))
    }

    /// Current presence list, used for full `joined` broadcasts.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ParticipantInfo> {
        self.entries
            .iter()
            .map(|p| ParticipantInfo {
                connection_id: p.connection_id,
                username: p.username.clone(),
            })
            .collect()
    }

    /// Number of registered participants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no participants are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = Registry::new();
        let conn = ConnectionId::new();

        registry.register(conn, "alice".to_string());

        assert_eq!(registry.lookup("alice"), Some(conn));
        assert_eq!(registry.lookup("bob"), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_usernames_resolve_to_first_registration() {
        let mut registry = Registry::new();
        let first = ConnectionId::new();
        let second = ConnectionId::new();

        registry.register(first, "alice".to_string());
        registry.register(second, "alice".to_string());

        assert_eq!(registry.lookup("alice"), Some(first));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unregister_removes_exactly_one_entry() {
        let mut registry = Registry::new();
        let c1 = ConnectionId::new();
        let c2 = ConnectionId::new();
        registry.register(c1, "alice".to_string());
        registry.register(c2, "alice".to_string());

        let removed = registry.unregister(c1).unwrap();
        assert_eq!(removed.username, "alice");
        assert_eq!(removed.connection_id, c1);

        // The duplicate now resolves.
        assert_eq!(registry.lookup("alice"), Some(c2));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_unknown_connection_is_none() {
        let mut registry = Registry::new();
        registry.register(ConnectionId::new(), "alice".to_string());

        assert!(registry.unregister(ConnectionId::new()).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_snapshot_preserves_insertion_order() {
        let mut registry = Registry::new();
        let c1 = ConnectionId::new();
        let c2 = ConnectionId::new();
        registry.register(c1, "alice".to_string());
        registry.register(c2, "bob".to_string());

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].username, "alice");
        assert_eq!(snapshot[0].connection_id, c1);
        assert_eq!(snapshot[1].username, "bob");
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert!(registry.snapshot().is_empty());
        assert_eq!(registry.lookup("anyone"), None);
    }
}
