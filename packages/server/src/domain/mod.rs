//! Domain layer for collaboration rooms.
//!
//! This module contains business types that are independent of
//! transport and infrastructure concerns.

pub mod directory;
pub mod entity;
pub mod error;
pub mod message;
pub mod value_object;

pub use directory::RoomDirectory;
#[cfg(test)]
pub use directory::MockRoomDirectory;
pub use entity::{DEFAULT_ROOM_CAPACITY, Identity, Member, RoomSnapshot};
pub use error::{RoomError, ValueObjectError};
pub use message::{Message, MessageKind, Presence};
pub use value_object::{ConnectionId, ProjectId, Timestamp, UserId, Username};
