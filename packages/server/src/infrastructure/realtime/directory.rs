//! Process-wide registry of live rooms.
//!
//! All mutations (create, register, unregister, remove, purge) go through a
//! single dispatcher task, so a room becoming empty and a new join for the
//! same project are always ordered against each other. Readers get the map
//! through a `RwLock` that only the dispatcher writes.
//!
//! Removal protocol: the directory counts joins it forwards to a room and the
//! room counts joins it has handled. `RemoveIfEmpty` only drops the entry when
//! no join is in flight and the published membership is empty; the room is then
//! told to shut down. A join that raced the drain simply keeps the room alive.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{
    RwLock,
    mpsc::{self, UnboundedSender, WeakUnboundedSender},
    oneshot,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    client::Client,
    config::RealtimeConfig,
    room::{RoomHandle, spawn_room},
};
use crate::domain::{ConnectionId, Message, ProjectId, RoomDirectory, RoomError, RoomSnapshot};

/// Attempts to place a client when the target room exits under our feet
const REGISTER_ATTEMPTS: usize = 2;

#[derive(Debug)]
pub(crate) enum DirectoryCommand {
    FindOrCreate {
        project_id: ProjectId,
        reply: oneshot::Sender<RoomHandle>,
    },
    Register(Client),
    Unregister {
        project_id: ProjectId,
        connection_id: ConnectionId,
    },
    RemoveIfEmpty(ProjectId),
    /// Sent by a room's drop guard, whatever the reason it stopped
    RoomTerminated {
        project_id: ProjectId,
        room_id: Uuid,
    },
    Shutdown {
        done: oneshot::Sender<()>,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("room directory has stopped")]
    Stopped,
}

type RoomMap = Arc<RwLock<HashMap<ProjectId, RoomHandle>>>;

/// Handle to the directory. Cloning is cheap; all clones share one dispatcher.
#[derive(Debug, Clone)]
pub struct Directory {
    commands: UnboundedSender<DirectoryCommand>,
    rooms: RoomMap,
    config: Arc<RealtimeConfig>,
}

impl Directory {
    /// Spawn the dispatcher task. Call once at startup, inside a Tokio runtime.
    pub fn start(config: RealtimeConfig) -> Self {
        let (commands, inbox) = mpsc::unbounded_channel();
        let rooms: RoomMap = Arc::new(RwLock::new(HashMap::new()));
        let config = Arc::new(config);

        let dispatcher = Dispatcher {
            rooms: rooms.clone(),
            config: config.clone(),
            commands: commands.downgrade(),
        };
        tokio::spawn(dispatcher.run(inbox));

        Self {
            commands,
            rooms,
            config,
        }
    }

    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Existing room for the project, or a newly started one.
    ///
    /// Concurrent callers for the same project always observe the same room.
    pub async fn find_or_create(&self, project_id: ProjectId) -> Result<RoomHandle, DirectoryError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(DirectoryCommand::FindOrCreate { project_id, reply })
            .map_err(|_| DirectoryError::Stopped)?;
        response.await.map_err(|_| DirectoryError::Stopped)
    }

    pub async fn find(&self, project_id: &ProjectId) -> Option<RoomHandle> {
        self.rooms.read().await.get(project_id).cloned()
    }

    /// Ask the dispatcher to drop the project's room if it is empty. Advisory only.
    pub fn remove_if_empty(&self, project_id: ProjectId) {
        self.send(DirectoryCommand::RemoveIfEmpty(project_id));
    }

    /// Route a pending client into its project's room, creating the room if needed.
    pub fn register_connection(&self, client: Client) {
        self.send(DirectoryCommand::Register(client));
    }

    /// Route a leave to the project's room; dropped if the room is gone.
    pub fn unregister_connection(&self, project_id: ProjectId, connection_id: ConnectionId) {
        self.send(DirectoryCommand::Unregister {
            project_id,
            connection_id,
        });
    }

    pub async fn snapshot(&self, project_id: &ProjectId) -> Option<RoomSnapshot> {
        let room = self.find(project_id).await?;
        Some(room.snapshot().await)
    }

    /// Snapshots of every live room, ordered by project id.
    pub async fn list(&self) -> Vec<RoomSnapshot> {
        let rooms: Vec<RoomHandle> = self.rooms.read().await.values().cloned().collect();
        let mut snapshots = Vec::with_capacity(rooms.len());
        for room in rooms {
            snapshots.push(room.snapshot().await);
        }
        snapshots.sort_by(|a, b| a.project_id.as_str().cmp(b.project_id.as_str()));
        snapshots
    }

    /// Shut every room down and stop the dispatcher.
    pub async fn shutdown(&self) {
        let (done, stopped) = oneshot::channel();
        if self.commands.send(DirectoryCommand::Shutdown { done }).is_ok() {
            let _ = stopped.await;
        }
    }

    fn send(&self, command: DirectoryCommand) {
        if self.commands.send(command).is_err() {
            warn!("room directory has stopped, command dropped");
        }
    }
}

#[async_trait]
impl RoomDirectory for Directory {
    fn capacity(&self) -> usize {
        self.config.max_users
    }

    async fn room_snapshot(&self, project_id: &ProjectId) -> Option<RoomSnapshot> {
        self.snapshot(project_id).await
    }

    async fn list_rooms(&self) -> Vec<RoomSnapshot> {
        self.list().await
    }

    async fn send_to_room(&self, project_id: &ProjectId, message: Message) -> Result<(), RoomError> {
        let room = self
            .find(project_id)
            .await
            .ok_or_else(|| RoomError::NotFound(project_id.to_string()))?;
        room.broadcast(message)
    }

    fn unregister(&self, project_id: &ProjectId, connection_id: ConnectionId) {
        self.unregister_connection(project_id.clone(), connection_id);
    }
}

/// The only writer of the room map.
struct Dispatcher {
    rooms: RoomMap,
    config: Arc<RealtimeConfig>,
    /// Handed to rooms; weak so the dispatcher does not keep itself alive
    commands: WeakUnboundedSender<DirectoryCommand>,
}

impl Dispatcher {
    async fn run(self, mut inbox: mpsc::UnboundedReceiver<DirectoryCommand>) {
        info!("room directory started");

        while let Some(command) = inbox.recv().await {
            match command {
                DirectoryCommand::FindOrCreate { project_id, reply } => {
                    if let Some(room) = self.find_or_create(project_id).await {
                        let _ = reply.send(room);
                    }
                }
                DirectoryCommand::Register(client) => self.register(client).await,
                DirectoryCommand::Unregister {
                    project_id,
                    connection_id,
                } => self.unregister(project_id, connection_id).await,
                DirectoryCommand::RemoveIfEmpty(project_id) => self.remove_if_empty(project_id).await,
                DirectoryCommand::RoomTerminated {
                    project_id,
                    room_id,
                } => self.purge(project_id, room_id).await,
                DirectoryCommand::Shutdown { done } => {
                    self.shutdown_rooms().await;
                    let _ = done.send(());
                    break;
                }
            }
        }

        info!("room directory stopped");
    }

    async fn find_or_create(&self, project_id: ProjectId) -> Option<RoomHandle> {
        if let Some(room) = self.rooms.read().await.get(&project_id) {
            return Some(room.clone());
        }

        let Some(commands) = self.commands.upgrade() else {
            warn!(%project_id, "directory is shutting down, not creating room");
            return None;
        };
        let room = spawn_room(project_id.clone(), &self.config, commands);
        info!(%project_id, room_id = %room.id(), "room created");
        self.rooms.write().await.insert(project_id, room.clone());
        Some(room)
    }

    async fn register(&self, mut client: Client) {
        let project_id = client.identity().project_id.clone();

        for _ in 0..REGISTER_ATTEMPTS {
            let Some(room) = self.find_or_create(project_id.clone()).await else {
                return;
            };
            match room.join(client).await {
                Ok(()) => {
                    debug!(%project_id, room_id = %room.id(), "client forwarded to room");
                    return;
                }
                Err(returned) => {
                    warn!(%project_id, room_id = %room.id(), "room exited before join, recreating");
                    self.purge(project_id.clone(), room.id()).await;
                    client = returned;
                }
            }
        }

        warn!(
            %project_id,
            connection_id = %client.connection_id(),
            "could not place client in a room, closing it"
        );
    }

    async fn unregister(&self, project_id: ProjectId, connection_id: ConnectionId) {
        let room = self.rooms.read().await.get(&project_id).cloned();
        match room {
            Some(room) => {
                if !room.leave(connection_id).await {
                    debug!(%project_id, %connection_id, "room exited before leave");
                }
            }
            None => debug!(%project_id, %connection_id, "unregister for unknown room dropped"),
        }
    }

    async fn remove_if_empty(&self, project_id: ProjectId) {
        let Some(room) = self.rooms.read().await.get(&project_id).cloned() else {
            return;
        };

        let pending = room.pending_joins();
        if pending > 0 {
            debug!(%project_id, pending, "joins in flight, keeping room");
            return;
        }
        if room.member_count().await > 0 {
            debug!(%project_id, "room has members again, keeping it");
            return;
        }

        self.rooms.write().await.remove(&project_id);
        info!(%project_id, room_id = %room.id(), "empty room removed");
        room.shutdown().await;
    }

    async fn purge(&self, project_id: ProjectId, room_id: Uuid) {
        let mut rooms = self.rooms.write().await;
        if rooms.get(&project_id).is_some_and(|room| room.id() == room_id) {
            rooms.remove(&project_id);
            warn!(%project_id, %room_id, "room stopped unexpectedly, entry purged");
        }
    }

    async fn shutdown_rooms(&self) {
        let rooms: Vec<RoomHandle> = self.rooms.write().await.drain().map(|(_, room)| room).collect();
        info!(rooms = rooms.len(), "shutting down rooms");
        for room in rooms {
            room.shutdown().await;
        }
    }
}
