//! Room actor: the single writer for one project's membership.
//!
//! Every join, leave, broadcast and shutdown for a project is processed by one
//! task, strictly in mailbox order. Outside readers only ever see the member
//! list through [`RoomHandle::snapshot`], a copy published behind a `RwLock`.
//!
//! ```text
//!  directory ──Join/Leave/Shutdown──┐
//!                                   ├──> mailbox ──> RoomActor ──try_send──> client mailboxes
//!  read pumps ──Broadcast (lossy)───┘                   │
//!                                                       └──RemoveIfEmpty──> directory
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::{
    RwLock,
    mpsc::{
        self,
        error::{SendError, TrySendError},
    },
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{
    client::{Client, Outbound},
    config::RealtimeConfig,
    directory::DirectoryCommand,
};
use crate::{
    domain::{ConnectionId, Member, Message, Presence, ProjectId, RoomError, RoomSnapshot},
    infrastructure::dto::websocket::encode,
};

/// Events a room processes, one at a time
#[derive(Debug)]
pub(crate) enum RoomEvent {
    Join(Client),
    Leave(ConnectionId),
    Broadcast(Message),
    Shutdown,
}

/// Lifecycle of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RoomState {
    /// Accepting join / leave / broadcast
    Active,
    /// Membership reached zero; removal requested from the directory
    Draining,
    /// Loop exited, every member mailbox closed
    Terminated,
}

/// State readable from outside the room's task
#[derive(Debug)]
struct RoomShared {
    max_users: usize,
    members: RwLock<Vec<Member>>,
    /// Joins the directory has pushed into the mailbox
    joins_forwarded: AtomicU64,
    /// Joins the room has finished handling (accepted or refused)
    joins_processed: AtomicU64,
}

/// Cheap, cloneable reference to a running room.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    id: Uuid,
    project_id: ProjectId,
    mailbox: mpsc::Sender<RoomEvent>,
    shared: Arc<RoomShared>,
}

impl RoomHandle {
    /// Unique per room instance; a recreated room for the same project gets a new id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn max_users(&self) -> usize {
        self.shared.max_users
    }

    pub async fn snapshot(&self) -> RoomSnapshot {
        let members = self.shared.members.read().await.clone();
        RoomSnapshot {
            project_id: self.project_id.clone(),
            max_users: self.shared.max_users,
            members,
        }
    }

    pub async fn member_count(&self) -> usize {
        self.shared.members.read().await.len()
    }

    /// Queue a message for fan-out without waiting.
    ///
    /// A full mailbox drops the message (logged). A closed mailbox means the
    /// room has terminated and is reported as not found.
    pub fn broadcast(&self, message: Message) -> Result<(), RoomError> {
        match self.mailbox.try_send(RoomEvent::Broadcast(message)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!(project_id = %self.project_id, "room mailbox full, dropping broadcast");
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(RoomError::NotFound(self.project_id.to_string())),
        }
    }

    /// Hand a client to the room. Gives the client back if the room is gone.
    pub(crate) async fn join(&self, client: Client) -> Result<(), Client> {
        self.shared.joins_forwarded.fetch_add(1, Ordering::SeqCst);
        if let Err(SendError(RoomEvent::Join(client))) =
            self.mailbox.send(RoomEvent::Join(client)).await
        {
            return Err(client);
        }
        Ok(())
    }

    /// Returns false if the room is gone.
    pub(crate) async fn leave(&self, connection_id: ConnectionId) -> bool {
        self.mailbox
            .send(RoomEvent::Leave(connection_id))
            .await
            .is_ok()
    }

    pub(crate) async fn shutdown(&self) {
        if self.mailbox.send(RoomEvent::Shutdown).await.is_err() {
            debug!(project_id = %self.project_id, "shutdown sent to a room that already exited");
        }
    }

    /// Joins forwarded to the room that it has not handled yet
    pub(crate) fn pending_joins(&self) -> u64 {
        let forwarded = self.shared.joins_forwarded.load(Ordering::SeqCst);
        let processed = self.shared.joins_processed.load(Ordering::SeqCst);
        forwarded.saturating_sub(processed)
    }
}

/// Start a room task for `project_id`.
pub(crate) fn spawn_room(
    project_id: ProjectId,
    config: &RealtimeConfig,
    directory: mpsc::UnboundedSender<DirectoryCommand>,
) -> RoomHandle {
    let (mailbox, inbox) = mpsc::channel(config.room_mailbox_capacity);
    let shared = Arc::new(RoomShared {
        max_users: config.max_users,
        members: RwLock::new(Vec::new()),
        joins_forwarded: AtomicU64::new(0),
        joins_processed: AtomicU64::new(0),
    });
    let handle = RoomHandle {
        id: Uuid::new_v4(),
        project_id: project_id.clone(),
        mailbox,
        shared: shared.clone(),
    };

    let actor = RoomActor {
        id: handle.id,
        project_id,
        members: Vec::new(),
        state: RoomState::Active,
        shared,
        directory,
    };
    tokio::spawn(actor.run(inbox));

    handle
}

struct RoomActor {
    id: Uuid,
    project_id: ProjectId,
    /// Join order is preserved for snapshots
    members: Vec<Client>,
    state: RoomState,
    shared: Arc<RoomShared>,
    directory: mpsc::UnboundedSender<DirectoryCommand>,
}

impl RoomActor {
    async fn run(mut self, mut inbox: mpsc::Receiver<RoomEvent>) {
        info!(project_id = %self.project_id, room_id = %self.id, "room started");

        while let Some(event) = inbox.recv().await {
            match event {
                RoomEvent::Join(client) => self.handle_join(client).await,
                RoomEvent::Leave(connection_id) => self.handle_leave(connection_id).await,
                RoomEvent::Broadcast(message) => self.broadcast(&message).await,
                RoomEvent::Shutdown => break,
            }
        }

        inbox.close();
        self.terminate().await;
    }

    async fn handle_join(&mut self, mut client: Client) {
        if self.members.len() >= self.shared.max_users {
            warn!(
                project_id = %self.project_id,
                user_id = %client.identity().user_id,
                "room full, refusing join"
            );
            self.shared.joins_processed.fetch_add(1, Ordering::SeqCst);
            match encode(&Message::room_full(self.shared.max_users)) {
                Ok(text) => {
                    if let Err(e) = client.try_deliver(text.into()) {
                        debug!("could not queue room-full error: {e}");
                    }
                }
                Err(e) => error!("failed to serialize room-full error: {e}"),
            }
            // Dropping the client closes its mailbox; the write pump flushes and closes.
            drop(client);
            return;
        }

        if self.state == RoomState::Draining {
            info!(project_id = %self.project_id, "join arrived while draining, room stays active");
            self.state = RoomState::Active;
        }

        client.mark_joined();
        let identity = client.identity().clone();
        self.members.push(client);
        self.publish().await;
        self.shared.joins_processed.fetch_add(1, Ordering::SeqCst);

        info!(
            project_id = %self.project_id,
            user_id = %identity.user_id,
            users_count = self.members.len(),
            "client joined room"
        );
        let presence = self.presence();
        self.broadcast(&Message::user_joined(identity, presence)).await;
    }

    async fn handle_leave(&mut self, connection_id: ConnectionId) {
        let Some(index) = self
            .members
            .iter()
            .position(|c| c.connection_id() == connection_id)
        else {
            debug!(project_id = %self.project_id, %connection_id, "leave for non-member ignored");
            return;
        };

        let client = self.members.remove(index);
        let identity = client.identity().clone();
        drop(client);
        self.publish().await;

        info!(
            project_id = %self.project_id,
            user_id = %identity.user_id,
            users_count = self.members.len(),
            "client left room"
        );

        if self.members.is_empty() {
            self.begin_draining();
        } else {
            let presence = self.presence();
            self.broadcast(&Message::user_left(identity, presence)).await;
        }
    }

    /// Serialize once, then try every member's mailbox. Full mailboxes are evicted.
    async fn broadcast(&mut self, message: &Message) {
        let wire: Outbound = match encode(message) {
            Ok(text) => text.into(),
            Err(e) => {
                error!(project_id = %self.project_id, "failed to serialize message: {e}");
                return;
            }
        };

        debug!(
            project_id = %self.project_id,
            recipients = self.members.len(),
            "broadcasting message"
        );

        let before = self.members.len();
        let project_id = &self.project_id;
        self.members
            .retain(|client| match client.try_deliver(wire.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    warn!(
                        %project_id,
                        user_id = %client.identity().user_id,
                        "client mailbox full, evicting slow consumer"
                    );
                    false
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(
                        %project_id,
                        user_id = %client.identity().user_id,
                        "client mailbox closed, dropping member"
                    );
                    false
                }
            });

        if self.members.len() != before {
            self.publish().await;
            if self.members.is_empty() {
                self.begin_draining();
            }
        }
    }

    fn begin_draining(&mut self) {
        self.state = RoomState::Draining;
        info!(project_id = %self.project_id, "room empty, requesting removal");
        let command = DirectoryCommand::RemoveIfEmpty(self.project_id.clone());
        if self.directory.send(command).is_err() {
            debug!(project_id = %self.project_id, "directory already stopped");
        }
    }

    fn presence(&self) -> Presence {
        Presence {
            users_count: self.members.len(),
            users: self.members.iter().map(Client::member).collect(),
        }
    }

    async fn publish(&self) {
        let members: Vec<Member> = self.members.iter().map(Client::member).collect();
        *self.shared.members.write().await = members;
    }

    async fn terminate(&mut self) {
        let remaining = self.members.len();
        self.members.clear();
        self.publish().await;
        self.state = RoomState::Terminated;
        info!(
            project_id = %self.project_id,
            room_id = %self.id,
            remaining,
            "room terminated"
        );
    }
}

impl Drop for RoomActor {
    // Runs on normal exit and while unwinding from a panic in the loop.
    fn drop(&mut self) {
        if self.state != RoomState::Terminated {
            error!(
                project_id = %self.project_id,
                room_id = %self.id,
                state = ?self.state,
                "room task exited abnormally"
            );
        }
        let _ = self.directory.send(DirectoryCommand::RoomTerminated {
            project_id: self.project_id.clone(),
            room_id: self.id,
        });
    }
}
