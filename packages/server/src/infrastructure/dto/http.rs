//! HTTP API request/response DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use roomcast_shared::time::millis_to_rfc3339;

use crate::domain::{Member, RoomSnapshot};

/// Connected user entry in room info responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectedUserDto {
    pub user_id: String,
    pub username: String,
    pub joined_at: String, // ISO 8601
}

impl From<&Member> for ConnectedUserDto {
    fn from(member: &Member) -> Self {
        Self {
            user_id: member.user_id.as_str().to_string(),
            username: member.username.as_str().to_string(),
            joined_at: millis_to_rfc3339(member.joined_at.value()),
        }
    }
}

/// Room status for the detail and list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInfoDto {
    pub project_id: String,
    pub users_count: usize,
    pub max_users: usize,
    pub connected_users: Vec<ConnectedUserDto>,
    pub is_full: bool,
}

impl From<&RoomSnapshot> for RoomInfoDto {
    fn from(snapshot: &RoomSnapshot) -> Self {
        Self {
            project_id: snapshot.project_id.as_str().to_string(),
            users_count: snapshot.users_count(),
            max_users: snapshot.max_users,
            connected_users: snapshot.members.iter().map(ConnectedUserDto::from).collect(),
            is_full: snapshot.is_full(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomListDto {
    pub rooms: Vec<RoomInfoDto>,
    pub total: usize,
}

/// Body of `POST /ws/room/{project_id}/message`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequestDto {
    pub r#type: String,
    #[serde(default)]
    pub data: Value,
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageResponseDto {
    pub message: String,
    pub r#type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KickResponseDto {
    pub message: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub error: String,
}
