//! Axum surface: handlers, shared state and the server runner.

mod handler;
mod runner;
mod signal;
pub mod state;

pub use runner::{build_router, run, serve};
