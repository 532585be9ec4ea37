//! A participant handed from a connection to its room.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::domain::{ConnectionId, Identity, Member, Timestamp};

/// Serialized wire message queued for one connection
pub type Outbound = Arc<str>;

/// Receiving end of a client's outbound mailbox, consumed by the write pump.
pub type Outbox = mpsc::Receiver<Outbound>;

/// One participant: identity plus the sending half of its outbound mailbox.
///
/// The mailbox has exactly one sender, owned here. Dropping the `Client`
/// closes the mailbox, which tells the write pump to send a close frame.
#[derive(Debug)]
pub struct Client {
    connection_id: ConnectionId,
    identity: Identity,
    joined_at: Timestamp,
    mailbox: mpsc::Sender<Outbound>,
}

impl Client {
    /// Create a pending client and the outbox its write pump will drain.
    pub fn new(identity: Identity, mailbox_capacity: usize) -> (Self, Outbox) {
        let (mailbox, outbox) = mpsc::channel(mailbox_capacity);
        let client = Self {
            connection_id: ConnectionId::generate(),
            identity,
            joined_at: Timestamp::now(),
            mailbox,
        };
        (client, outbox)
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub(crate) fn mark_joined(&mut self) {
        self.joined_at = Timestamp::now();
    }

    pub fn member(&self) -> Member {
        Member {
            connection_id: self.connection_id,
            user_id: self.identity.user_id.clone(),
            username: self.identity.username.clone(),
            joined_at: self.joined_at,
        }
    }

    /// Non-blocking enqueue; fails when the mailbox is full or the pump is gone.
    pub fn try_deliver(&self, message: Outbound) -> Result<(), TrySendError<Outbound>> {
        self.mailbox.try_send(message)
    }
}
