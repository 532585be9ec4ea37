//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};

use crate::{
    domain::{Identity, ProjectId, UserId, Username},
    infrastructure::dto::http::{
        ErrorResponseDto, KickResponseDto, RoomInfoDto, RoomListDto, SendMessageRequestDto,
        SendMessageResponseDto,
    },
    ui::state::AppState,
    usecase::{
        KickError, KickParticipantUseCase, QueryRoomsUseCase, SendMessageError,
        SendMessageUseCase,
    },
};

/// Header naming the administrator who issued a kick
const ADMIN_HEADER: &str = "x-user-id";

type ApiError = (StatusCode, Json<ErrorResponseDto>);

fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponseDto {
            error: error.to_string(),
        }),
    )
}

fn bad_request(error: impl ToString) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, error)
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get room info; an absent room reports zero users
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> Result<Json<RoomInfoDto>, ApiError> {
    let project_id = ProjectId::try_from(project_id).map_err(bad_request)?;

    let usecase = QueryRoomsUseCase::new(state.rooms.clone());
    let snapshot = usecase.room(project_id).await;

    Ok(Json(RoomInfoDto::from(&snapshot)))
}

/// Get list of live rooms
pub async fn list_rooms(State(state): State<Arc<AppState>>) -> Json<RoomListDto> {
    let usecase = QueryRoomsUseCase::new(state.rooms.clone());
    let rooms: Vec<RoomInfoDto> = usecase.list().await.iter().map(RoomInfoDto::from).collect();

    Json(RoomListDto {
        total: rooms.len(),
        rooms,
    })
}

/// Relay a message into a room on behalf of a server-side caller
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
    payload: Result<Json<SendMessageRequestDto>, JsonRejection>,
) -> Result<Json<SendMessageResponseDto>, ApiError> {
    let Json(request) = payload.map_err(|e| bad_request(e.body_text()))?;

    // Convert String -> Domain Models
    let author = Identity::new(
        ProjectId::try_from(project_id).map_err(bad_request)?,
        UserId::try_from(request.user_id).map_err(bad_request)?,
        Username::try_from(request.username).map_err(bad_request)?,
    );

    let usecase = SendMessageUseCase::new(state.rooms.clone());
    match usecase
        .execute(request.r#type.clone(), request.data, author)
        .await
    {
        Ok(()) => Ok(Json(SendMessageResponseDto {
            message: "Message sent".to_string(),
            r#type: request.r#type,
        })),
        Err(e @ SendMessageError::RoomNotFound(_)) => {
            tracing::warn!("Failed to send message: {}", e);
            Err(api_error(StatusCode::NOT_FOUND, e))
        }
    }
}

/// Force a user out of a room
pub async fn kick_user(
    State(state): State<Arc<AppState>>,
    Path((project_id, user_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<KickResponseDto>, ApiError> {
    let project_id = ProjectId::try_from(project_id).map_err(bad_request)?;
    let user_id = UserId::try_from(user_id).map_err(bad_request)?;
    let admin = headers
        .get(ADMIN_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| UserId::try_from(value.to_string()).ok());

    let usecase = KickParticipantUseCase::new(state.rooms.clone());
    match usecase.execute(&project_id, &user_id, admin).await {
        Ok(_) => Ok(Json(KickResponseDto {
            message: "User kicked".to_string(),
            user_id: user_id.into_string(),
        })),
        Err(e @ (KickError::RoomNotFound(_) | KickError::UserNotFound { .. })) => {
            tracing::warn!("Failed to kick user: {}", e);
            Err(api_error(StatusCode::NOT_FOUND, e))
        }
    }
}
