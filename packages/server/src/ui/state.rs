//! Server state shared by every handler.

use std::sync::Arc;

use serde::Deserialize;

use crate::{domain::RoomDirectory, infrastructure::realtime::Directory};

/// Query parameters for the WebSocket upgrade
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub project_id: Option<String>,
    pub user_id: Option<String>,
    pub username: Option<String>,
}

/// Shared application state
pub struct AppState {
    /// Live room directory, handed to each upgraded connection
    pub directory: Directory,
    /// Same directory seen through the domain port, for the use cases
    pub rooms: Arc<dyn RoomDirectory>,
}

impl AppState {
    pub fn new(directory: Directory) -> Self {
        let rooms: Arc<dyn RoomDirectory> = Arc::new(directory.clone());
        Self { directory, rooms }
    }
}
