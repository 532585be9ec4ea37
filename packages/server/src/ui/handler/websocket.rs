//! WebSocket connection handler.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, ws::WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::StreamExt;

use crate::{
    domain::{Identity, ProjectId, UserId, Username, ValueObjectError},
    infrastructure::{
        dto::http::ErrorResponseDto,
        realtime::{Client, serve_connection},
    },
    ui::state::{AppState, ConnectQuery},
    usecase::ConnectParticipantUseCase,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Response {
    // Convert query strings -> Identity (Domain Model)
    let identity = match parse_identity(query) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!("Rejecting connection with invalid identity: {}", e);
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    // Refuse before upgrading when the room is already full
    let connect_usecase = ConnectParticipantUseCase::new(state.rooms.clone());
    if let Err(e) = connect_usecase.execute(&identity).await {
        tracing::warn!(
            "Rejecting '{}' for project '{}': {}",
            identity.user_id,
            identity.project_id,
            e
        );
        return error_response(StatusCode::FORBIDDEN, e.to_string());
    }

    let config = state.directory.config();
    let directory = state.directory.clone();
    let (client, outbox) = Client::new(identity, config.client_mailbox_capacity);

    ws.max_message_size(config.max_frame_size)
        .max_frame_size(config.max_frame_size)
        .on_upgrade(move |socket| async move {
            let (sink, stream) = socket.split();
            serve_connection(stream, sink, client, outbox, directory).await;
        })
        .into_response()
}

fn parse_identity(query: ConnectQuery) -> Result<Identity, ValueObjectError> {
    let project_id = ProjectId::try_from(query.project_id.unwrap_or_default())?;
    let user_id = UserId::try_from(query.user_id.unwrap_or_default())?;
    let username = Username::try_from(query.username.unwrap_or_default())?;
    Ok(Identity::new(project_id, user_id, username))
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponseDto { error })).into_response()
}
