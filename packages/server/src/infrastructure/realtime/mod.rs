//! Realtime engine: rooms, the room directory and connection pumps.

pub mod client;
pub mod config;
pub mod directory;
pub mod pump;
pub mod room;
pub mod transport;

pub use client::{Client, Outbound, Outbox};
pub use config::RealtimeConfig;
pub use directory::{Directory, DirectoryError};
pub use pump::serve_connection;
pub use room::RoomHandle;
pub use transport::{Frame, FrameReader, FrameWriter, TransportError};
