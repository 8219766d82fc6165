//! Room directory: room name to member set
//!
//! Rooms have no standalone lifecycle: one is created by the first join and
//! deleted by the last leave, so an entry exists iff its member set is
//! non-empty. Owned exclusively by the server's event-processing task.

use std::collections::{HashMap, HashSet};

use super::registry::ConnId;

/// All active rooms and their members
#[derive(Debug, Default)]
pub struct RoomDirectory {
    rooms: HashMap<String, HashSet<ConnId>>,
}

impl RoomDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a room, creating the room if absent
    pub fn join(&mut self, room: &str, conn_id: ConnId) {
        self.rooms.entry(room.to_string()).or_default().insert(conn_id);
    }

    /// Remove a connection from a room, deleting the room once empty
    ///
    /// Returns whether the connection was a member.
    pub fn leave(&mut self, room: &str, conn_id: ConnId) -> bool {
        let Some(members) = self.rooms.get_mut(room) else {
            return false;
        };
        let removed = members.remove(&conn_id);
        if members.is_empty() {
            self.rooms.remove(room);
        }
        removed
    }

    /// Whether a room currently exists
    pub fn contains(&self, room: &str) -> bool {
        self.rooms.contains_key(room)
    }

    /// Whether a connection is a member of a room
    pub fn is_member(&self, room: &str, conn_id: ConnId) -> bool {
        self.rooms
            .get(room)
            .map(|members| members.contains(&conn_id))
            .unwrap_or(false)
    }

    /// Snapshot of a room's members excluding one connection
    ///
    /// This is the recipient list for a broadcast: a stable copy taken
    /// under the event task, so membership changes cannot race an
    /// in-flight delivery.
    pub fn members_except(&self, room: &str, exclude: ConnId) -> Vec<ConnId> {
        self.rooms
            .get(room)
            .map(|members| members.iter().copied().filter(|&id| id != exclude).collect())
            .unwrap_or_default()
    }

    /// Number of members in a room (0 if absent)
    pub fn member_count(&self, room: &str) -> usize {
        self.rooms.get(room).map(|m| m.len()).unwrap_or(0)
    }

    /// Number of active rooms
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_created_on_first_join() {
        let mut rooms = RoomDirectory::new();
        assert!(!rooms.contains("lobby"));

        rooms.join("lobby", 1);
        assert!(rooms.contains("lobby"));
        assert!(rooms.is_member("lobby", 1));
        assert_eq!(rooms.member_count("lobby"), 1);
    }

    #[test]
    fn test_room_deleted_on_last_leave() {
        let mut rooms = RoomDirectory::new();
        rooms.join("lobby", 1);
        rooms.join("lobby", 2);

        assert!(rooms.leave("lobby", 1));
        assert!(rooms.contains("lobby"));

        assert!(rooms.leave("lobby", 2));
        assert!(!rooms.contains("lobby"));
        assert_eq!(rooms.room_count(), 0);
    }

    #[test]
    fn test_exists_iff_nonempty_after_every_mutation() {
        let mut rooms = RoomDirectory::new();

        rooms.join("a", 1);
        rooms.join("a", 2);
        rooms.join("b", 3);
        assert!(rooms.contains("a") == (rooms.member_count("a") > 0));
        assert!(rooms.contains("b") == (rooms.member_count("b") > 0));

        rooms.leave("a", 1);
        rooms.leave("a", 2);
        rooms.leave("b", 3);
        assert!(!rooms.contains("a"));
        assert!(!rooms.contains("b"));
    }

    #[test]
    fn test_leave_non_member() {
        let mut rooms = RoomDirectory::new();
        rooms.join("lobby", 1);

        assert!(!rooms.leave("lobby", 99));
        assert!(!rooms.leave("nowhere", 1));
        assert!(rooms.contains("lobby"));
    }

    #[test]
    fn test_members_except_excludes_sender() {
        let mut rooms = RoomDirectory::new();
        rooms.join("lobby", 1);
        rooms.join("lobby", 2);
        rooms.join("lobby", 3);

        let mut others = rooms.members_except("lobby", 2);
        others.sort_unstable();
        assert_eq!(others, vec![1, 3]);

        assert!(rooms.members_except("nowhere", 1).is_empty());
    }
}
