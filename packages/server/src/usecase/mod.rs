//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層の `RoomDirectory` を通じてルームを操作します。

pub mod connect_participant;
pub mod error;
pub mod kick_participant;
pub mod query_rooms;
pub mod send_message;

pub use connect_participant::ConnectParticipantUseCase;
pub use error::{ConnectError, KickError, SendMessageError};
pub use kick_participant::KickParticipantUseCase;
pub use query_rooms::QueryRoomsUseCase;
pub use send_message::SendMessageUseCase;
