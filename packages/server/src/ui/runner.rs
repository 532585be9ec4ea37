//! Router construction and server lifecycle.

use std::{future::Future, sync::Arc};

use axum::{
    Router,
    routing::{delete, get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerArgs,
    error::ServerError,
    infrastructure::realtime::Directory,
    ui::{
        handler::{get_room, health_check, kick_user, list_rooms, send_message, websocket_handler},
        signal::shutdown_signal,
        state::AppState,
    },
};

/// Build the application router over a running directory.
pub fn build_router(directory: Directory) -> Router {
    let state = Arc::new(AppState::new(directory));

    Router::new()
        .route("/api/health", get(health_check))
        .route("/ws/connect", get(websocket_handler))
        .route("/ws/rooms", get(list_rooms))
        .route("/ws/room/{project_id}", get(get_room))
        .route("/ws/room/{project_id}/message", post(send_message))
        .route("/ws/room/{project_id}/user/{user_id}", delete(kick_user))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` resolves.
///
/// Every room is shut down first so connected peers receive a close frame,
/// then in-flight HTTP requests are drained.
pub async fn serve<F>(listener: TcpListener, directory: Directory, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(directory.clone());

    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Listening on {}", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            directory.shutdown().await;
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Start the directory, bind, and serve until Ctrl+C or SIGTERM.
pub async fn run(args: ServerArgs) -> Result<(), ServerError> {
    let config = args.realtime_config()?;
    tracing::info!(
        "Room capacity {}, max frame {} bytes, pong wait {:?}",
        config.max_users,
        config.max_frame_size,
        config.pong_wait
    );
    let directory = Directory::start(config);

    let addr = args.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    serve(listener, directory, shutdown_signal()).await
}
