//! Session registry: per-connection identity state
//!
//! Maps each live connection to its nickname and current room. The registry
//! is owned exclusively by the server's event-processing task and mutated
//! only there, so it needs no interior locking.

use std::collections::HashMap;

/// Opaque identity of one live connection, drawn from a process-wide
/// sequence counter at accept time
pub type ConnId = u64;

/// Per-connection mutable identity state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Display name; unique across live sessions (case-sensitive)
    pub nickname: String,
    /// Room the session currently belongs to, if any
    pub current_room: Option<String>,
}

impl Session {
    /// Create a session with the default accept-time nickname
    fn new(conn_id: ConnId) -> Self {
        Self {
            nickname: format!("User{}", conn_id),
            current_room: None,
        }
    }
}

/// All live sessions, keyed by connection
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<ConnId, Session>,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection with its default `User<id>` nickname
    pub fn insert(&mut self, conn_id: ConnId) -> &Session {
        self.sessions.entry(conn_id).or_insert_with(|| Session::new(conn_id))
    }

    /// Remove a session, releasing its nickname
    pub fn remove(&mut self, conn_id: ConnId) -> Option<Session> {
        self.sessions.remove(&conn_id)
    }

    /// Get a session by connection
    pub fn get(&self, conn_id: ConnId) -> Option<&Session> {
        self.sessions.get(&conn_id)
    }

    /// Get the nickname of a connection
    pub fn nickname(&self, conn_id: ConnId) -> Option<&str> {
        self.sessions.get(&conn_id).map(|s| s.nickname.as_str())
    }

    /// Get the current room of a connection
    pub fn current_room(&self, conn_id: ConnId) -> Option<&str> {
        self.sessions
            .get(&conn_id)
            .and_then(|s| s.current_room.as_deref())
    }

    /// Record that a connection entered a room
    pub fn set_room(&mut self, conn_id: ConnId, room: &str) {
        if let Some(session) = self.sessions.get_mut(&conn_id) {
            session.current_room = Some(room.to_string());
        }
    }

    /// Record that a connection left its room
    pub fn clear_room(&mut self, conn_id: ConnId) {
        if let Some(session) = self.sessions.get_mut(&conn_id) {
            session.current_room = None;
        }
    }

    /// Whether any *other* session already holds `name`, exact match
    pub fn is_nickname_taken(&self, name: &str, exclude: ConnId) -> bool {
        self.sessions
            .iter()
            .any(|(&id, s)| id != exclude && s.nickname == name)
    }

    /// Change a connection's nickname, returning the old one
    pub fn rename(&mut self, conn_id: ConnId, new_name: &str) -> Option<String> {
        let session = self.sessions.get_mut(&conn_id)?;
        Some(std::mem::replace(&mut session.nickname, new_name.to_string()))
    }

    /// Resolve a nickname to its connection, ignoring case
    ///
    /// Lookup is case-insensitive while the `/nick` uniqueness check is
    /// case-sensitive; both observed behaviors are kept as-is, so two
    /// case-variant nicknames can coexist and the scan resolves to an
    /// arbitrary one of them.
    pub fn resolve_nickname(&self, name: &str) -> Option<ConnId> {
        let wanted = name.to_lowercase();
        self.sessions
            .iter()
            .find(|(_, s)| s.nickname.to_lowercase() == wanted)
            .map(|(&id, _)| id)
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether there are no live sessions
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_nickname() {
        let mut registry = SessionRegistry::new();
        let session = registry.insert(7);

        assert_eq!(session.nickname, "User7");
        assert!(session.current_room.is_none());
    }

    #[test]
    fn test_rename_releases_old_name() {
        let mut registry = SessionRegistry::new();
        registry.insert(1);

        let old = registry.rename(1, "alice").unwrap();
        assert_eq!(old, "User1");
        assert_eq!(registry.nickname(1), Some("alice"));
        assert!(!registry.is_nickname_taken("User1", 2));
    }

    #[test]
    fn test_uniqueness_is_case_sensitive_and_excludes_self() {
        let mut registry = SessionRegistry::new();
        registry.insert(1);
        registry.insert(2);
        registry.rename(1, "alice");

        assert!(registry.is_nickname_taken("alice", 2));
        assert!(!registry.is_nickname_taken("Alice", 2));
        // Renaming to your own current name is not a conflict.
        assert!(!registry.is_nickname_taken("alice", 1));
    }

    #[test]
    fn test_resolve_nickname_ignores_case() {
        let mut registry = SessionRegistry::new();
        registry.insert(1);
        registry.rename(1, "Alice");

        assert_eq!(registry.resolve_nickname("alice"), Some(1));
        assert_eq!(registry.resolve_nickname("ALICE"), Some(1));
        assert_eq!(registry.resolve_nickname("bob"), None);
    }

    #[test]
    fn test_remove_releases_everything() {
        let mut registry = SessionRegistry::new();
        registry.insert(1);
        registry.rename(1, "alice");
        registry.set_room(1, "lobby");

        let session = registry.remove(1).unwrap();
        assert_eq!(session.nickname, "alice");
        assert_eq!(session.current_room.as_deref(), Some("lobby"));
        assert!(registry.is_empty());
        assert_eq!(registry.resolve_nickname("alice"), None);
    }

    #[test]
    fn test_room_tracking() {
        let mut registry = SessionRegistry::new();
        registry.insert(1);

        registry.set_room(1, "lobby");
        assert_eq!(registry.current_room(1), Some("lobby"));

        registry.clear_room(1);
        assert_eq!(registry.current_room(1), None);
    }
}
