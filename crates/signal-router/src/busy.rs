//! Busy multiset: usernames currently engaged in a call lifecycle.
//!
//! A multiset rather than a set because two independent call attempts can
//! reference the same username before cleanup completes. Each terminal call
//! event removes at most one occurrence per party, so overlapping attempts
//! drain one entry at a time with an idempotent floor at zero. Out-of-order
//! arrivals can leave stray entries; they are tolerated, never a crash.

/// Multiset of busy usernames, backed by an ordered list.
#[derive(Debug, Default)]
pub struct BusyList {
    entries: Vec<String>,
}

impl BusyList {
    /// Create an empty busy list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append one occurrence of a username.
    pub fn mark(&mut self, username: &str) {
        self.entries.push(username.to_string());
    }

    /// Remove at most one occurrence (first match). No-op when absent.
    pub fn unmark(&mut self, username: &str) {
        if let Some(index) = self.entries.iter().position(|u| u == username) {
            self.entries.remove(index);
        }
    }

    /// Current contents, broadcast to all connections after every mutation.
    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.entries.clone()
    }

    /// Number of occurrences of a username.
    #[must_use]
    pub fn occurrences(&self, username: &str) -> usize {
        self.entries.iter().filter(|u| *u == username).count()
    }

    /// Whether the username has at least one occurrence.
    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.entries.iter().any(|u| u == username)
    }
}
