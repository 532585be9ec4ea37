//! Port through which use cases reach the room directory.

use async_trait::async_trait;

use super::{
    entity::RoomSnapshot,
    error::RoomError,
    message::Message,
    value_object::{ConnectionId, ProjectId},
};

/// Read and command access to the live rooms.
///
/// Implemented by the realtime directory; use cases depend on this trait only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// Capacity applied to every room
    fn capacity(&self) -> usize;

    /// Consistent copy of one room's membership, `None` if no room is live
    async fn room_snapshot(&self, project_id: &ProjectId) -> Option<RoomSnapshot>;

    /// Snapshots of every live room
    async fn list_rooms(&self) -> Vec<RoomSnapshot>;

    /// Enqueue a broadcast into the project's room.
    ///
    /// Overload drops the message silently; only a missing room is an error.
    async fn send_to_room(&self, project_id: &ProjectId, message: Message) -> Result<(), RoomError>;

    /// Force the connection out of the project's room
    fn unregister(&self, project_id: &ProjectId, connection_id: ConnectionId);
}
