//! Frame-level view of a physical connection.
//!
//! The pumps are generic over [`FrameReader`] / [`FrameWriter`]; the Axum
//! WebSocket halves implement them for production use.

use async_trait::async_trait;
use axum::extract::ws::{CloseFrame, Message as WsMessage, Utf8Bytes, WebSocket, close_code};
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use thiserror::Error;

/// One unit read from or written to a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    Ping,
    Pong,
    Close,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] axum::Error),

    #[error("write did not complete within the deadline")]
    WriteTimeout,
}

/// Inbound half of a connection
#[async_trait]
pub trait FrameReader: Send {
    /// Next frame, `None` once the peer is gone
    async fn read_frame(&mut self) -> Option<Result<Frame, TransportError>>;
}

/// Outbound half of a connection
#[async_trait]
pub trait FrameWriter: Send {
    async fn write_frame(&mut self, frame: Frame) -> Result<(), TransportError>;
}

#[async_trait]
impl FrameReader for SplitStream<WebSocket> {
    async fn read_frame(&mut self) -> Option<Result<Frame, TransportError>> {
        let message = match self.next().await? {
            Ok(message) => message,
            Err(e) => return Some(Err(e.into())),
        };
        let frame = match message {
            WsMessage::Text(text) => Frame::Text(text.as_str().to_owned()),
            WsMessage::Binary(bytes) => Frame::Binary(bytes.to_vec()),
            WsMessage::Ping(_) => Frame::Ping,
            WsMessage::Pong(_) => Frame::Pong,
            WsMessage::Close(_) => Frame::Close,
        };
        Some(Ok(frame))
    }
}

#[async_trait]
impl FrameWriter for SplitSink<WebSocket, WsMessage> {
    async fn write_frame(&mut self, frame: Frame) -> Result<(), TransportError> {
        let message = match frame {
            Frame::Text(text) => WsMessage::Text(text.into()),
            Frame::Binary(bytes) => WsMessage::Binary(bytes.into()),
            Frame::Ping => WsMessage::Ping(Default::default()),
            Frame::Pong => WsMessage::Pong(Default::default()),
            Frame::Close => WsMessage::Close(Some(CloseFrame {
                code: close_code::NORMAL,
                reason: Utf8Bytes::from_static(""),
            })),
        };
        self.send(message).await?;
        Ok(())
    }
}
