//! UseCase 層のエラー定義

use thiserror::Error;

/// 参加者接続のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("Room for project '{project_id}' is full: maximum {capacity} users allowed")]
    RoomFull { project_id: String, capacity: usize },
}

/// HTTP 経由のメッセージ送信のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    #[error("Room not found for project '{0}'")]
    RoomNotFound(String),
}

/// 参加者の強制退出のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KickError {
    #[error("Room not found for project '{0}'")]
    RoomNotFound(String),

    #[error("User '{user_id}' is not connected to project '{project_id}'")]
    UserNotFound { project_id: String, user_id: String },
}
