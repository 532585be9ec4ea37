//! Infrastructure layer: wire formats and the realtime room engine.

pub mod dto;
pub mod realtime;
