//! Shared helpers for integration tests.
//!
//! Each test gets its own in-process server on an ephemeral port.
#![allow(dead_code)]

use std::{net::SocketAddr, time::Duration};

use futures_util::{SinkExt, StreamExt};
use roomcast_server::{infrastructure::realtime::{Directory, RealtimeConfig}, serve};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::oneshot,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

pub type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(3);

pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(RealtimeConfig::default()).await
    }

    pub async fn start_with(config: RealtimeConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let directory = Directory::start(config);
        let (shutdown, stopped) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let signal = async move {
                let _ = stopped.await;
            };
            if let Err(e) = serve(listener, directory, signal).await {
                eprintln!("test server failed: {e}");
            }
        });

        Self {
            addr,
            shutdown: Some(shutdown),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self, project_id: &str, user_id: &str, username: &str) -> String {
        format!(
            "ws://{}/ws/connect?project_id={}&user_id={}&username={}",
            self.addr, project_id, user_id, username
        )
    }

    /// Connect and consume the caller's own `user_joined`.
    pub async fn join(&self, project_id: &str, user_id: &str) -> Socket {
        let url = self.ws_url(project_id, user_id, &user_id.to_uppercase());
        let (mut socket, _) = tokio_tungstenite::connect_async(url)
            .await
            .expect("Failed to connect");
        let joined = next_json(&mut socket).await;
        assert_eq!(joined["type"], "user_joined");
        assert_eq!(joined["user_id"], user_id);
        socket
    }

    pub async fn room_info(&self, project_id: &str) -> serde_json::Value {
        reqwest::get(format!("{}/ws/room/{}", self.base_url(), project_id))
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON")
    }

    /// Poll the room endpoint until it reports `expected` users.
    pub async fn wait_for_users(&self, project_id: &str, expected: u64) {
        for _ in 0..100 {
            if self.room_info(project_id).await["users_count"] == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("room {project_id} never reached {expected} users");
    }

    /// Poll the room list until no room is live.
    pub async fn wait_for_no_rooms(&self) {
        for _ in 0..100 {
            let rooms: serde_json::Value = reqwest::get(format!("{}/ws/rooms", self.base_url()))
                .await
                .expect("Failed to send request")
                .json()
                .await
                .expect("Failed to parse JSON");
            if rooms["total"] == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("rooms were never removed");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// Next text frame parsed as JSON, skipping keepalive frames.
pub async fn next_json(socket: &mut Socket) -> serde_json::Value {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, socket.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Socket closed")
            .expect("Socket error");
        match frame {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("Invalid JSON frame");
            }
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("Expected a text frame, got {other:?}"),
        }
    }
}

/// Wait for the server to close the socket.
pub async fn expect_closed(socket: &mut Socket) {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, socket.next())
            .await
            .expect("Timed out waiting for close");
        match frame {
            None | Some(Ok(Message::Close(_))) | Some(Err(_)) => return,
            Some(Ok(_)) => continue,
        }
    }
}

pub async fn send_json(socket: &mut Socket, value: serde_json::Value) {
    socket
        .send(Message::Text(value.to_string().into()))
        .await
        .expect("Failed to send frame");
}
