//! Core domain models for collaboration rooms.

use serde::{Deserialize, Serialize};

use super::value_object::{ConnectionId, ProjectId, Timestamp, UserId, Username};

/// Default maximum number of members allowed in a room
pub const DEFAULT_ROOM_CAPACITY: usize = 4;

/// Identity bound to a connection at upgrade time.
///
/// Every message authored over the connection is stamped with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub username: Username,
}

impl Identity {
    pub fn new(project_id: ProjectId, user_id: UserId, username: Username) -> Self {
        Self {
            project_id,
            user_id,
            username,
        }
    }
}

/// A member of a room as seen from outside the room's event loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Connection the membership belongs to
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub username: Username,
    /// When the room accepted the join
    pub joined_at: Timestamp,
}

/// Point-in-time copy of a room's membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub project_id: ProjectId,
    /// Maximum number of members allowed
    pub max_users: usize,
    /// Members in join order
    pub members: Vec<Member>,
}

impl RoomSnapshot {
    /// Snapshot of a room that does not exist (yet).
    pub fn empty(project_id: ProjectId, max_users: usize) -> Self {
        Self {
            project_id,
            max_users,
            members: Vec::new(),
        }
    }

    pub fn users_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_users
    }

    /// First member connected as `user_id`
    pub fn find_user(&self, user_id: &UserId) -> Option<&Member> {
        self.members.iter().find(|m| &m.user_id == user_id)
    }
}
