//! Handler modules for HTTP and WebSocket endpoints.

pub mod http;
pub mod websocket;

// Re-export HTTP handlers
pub use http::{get_room, health_check, kick_user, list_rooms, send_message};

// Re-export WebSocket handlers
pub use websocket::websocket_handler;
