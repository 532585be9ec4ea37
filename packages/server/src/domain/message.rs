//! Messages exchanged inside a room.
//!
//! Server-originated events are a closed set; everything a member sends is
//! relayed as-is under its own `type`, with the author's identity stamped on it.

use serde_json::Value;

use super::{
    entity::{Identity, Member},
    value_object::UserId,
};

/// Membership summary carried by `user_joined` / `user_left`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub users_count: usize,
    pub users: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageKind {
    UserJoined(Presence),
    UserLeft(Presence),
    /// Delivered to a join that was refused
    Error { reason: String },
    Kicked {
        reason: String,
        admin: Option<UserId>,
    },
    /// Application message relayed verbatim
    Relay { kind: String, data: Value },
}

/// Envelope routed through a room.
///
/// `identity` is `None` only for server errors that are not about any member.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub kind: MessageKind,
    pub identity: Option<Identity>,
}

impl Message {
    /// Relay a member-authored payload, stamped with the author's identity.
    pub fn relay(kind: String, data: Value, author: Identity) -> Self {
        Self {
            kind: MessageKind::Relay { kind, data },
            identity: Some(author),
        }
    }

    pub fn user_joined(member: Identity, presence: Presence) -> Self {
        Self {
            kind: MessageKind::UserJoined(presence),
            identity: Some(member),
        }
    }

    pub fn user_left(member: Identity, presence: Presence) -> Self {
        Self {
            kind: MessageKind::UserLeft(presence),
            identity: Some(member),
        }
    }

    pub fn room_full(capacity: usize) -> Self {
        Self {
            kind: MessageKind::Error {
                reason: format!("The room is full. Maximum {capacity} users."),
            },
            identity: None,
        }
    }

    pub fn kicked(target: Identity, admin: Option<UserId>) -> Self {
        Self {
            kind: MessageKind::Kicked {
                reason: "Removed by an administrator".to_string(),
                admin,
            },
            identity: Some(target),
        }
    }
}
