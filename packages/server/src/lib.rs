//! Roomcast server library.
//!
//! Real-time collaboration rooms keyed by project: clients connect over
//! WebSocket, join their project's room and receive everything broadcast to it.
//!
//! Layers follow the usual split: `domain` holds the types and the
//! `RoomDirectory` port, `usecase` the operations exposed over HTTP,
//! `infrastructure` the wire formats and the realtime engine, and `ui` the
//! Axum handlers and runner.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::ServerArgs;
pub use error::ServerError;
pub use ui::{build_router, run, serve};
