//! Per-connection read and write pumps.
//!
//! The read pump is the only reader of the connection: it enforces the frame
//! size limit and the keepalive deadline, stamps the connection's identity on
//! every inbound message and forwards it to the room. The write pump is the
//! only writer: it drains the client's outbox and sends periodic pings.

use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{
    client::{Client, Outbox},
    config::RealtimeConfig,
    directory::Directory,
    transport::{Frame, FrameReader, FrameWriter, TransportError},
};
use crate::{domain::Identity, infrastructure::dto::websocket::decode_inbound};

/// Drive one connection from registration to teardown.
///
/// Registers the client, runs both pumps, and unregisters exactly once when
/// either side stops.
pub async fn serve_connection<R, W>(
    reader: R,
    writer: W,
    client: Client,
    outbox: Outbox,
    directory: Directory,
) where
    R: FrameReader + 'static,
    W: FrameWriter + 'static,
{
    let identity = client.identity().clone();
    let connection_id = client.connection_id();
    let config = directory.config().clone();

    info!(
        project_id = %identity.project_id,
        user_id = %identity.user_id,
        %connection_id,
        "connection opened"
    );
    directory.register_connection(client);

    let mut write_task = tokio::spawn(write_pump(writer, outbox, config.clone()));
    let mut read_task = tokio::spawn(read_pump(
        reader,
        identity.clone(),
        directory.clone(),
        config.clone(),
    ));

    tokio::select! {
        _ = &mut read_task => {
            // Leaving the room drops the client, which closes the outbox and
            // lets the writer finish with a close frame.
            directory.unregister_connection(identity.project_id.clone(), connection_id);
            if tokio::time::timeout(config.write_wait, &mut write_task).await.is_err() {
                debug!(%connection_id, "write pump did not finish in time, aborting");
                write_task.abort();
            }
        }
        _ = &mut write_task => {
            read_task.abort();
            directory.unregister_connection(identity.project_id.clone(), connection_id);
        }
    }

    info!(
        project_id = %identity.project_id,
        user_id = %identity.user_id,
        %connection_id,
        "connection closed"
    );
}

/// Read frames until the peer leaves, misbehaves, or stops answering pings.
pub(crate) async fn read_pump<R: FrameReader>(
    mut reader: R,
    identity: Identity,
    directory: Directory,
    config: RealtimeConfig,
) {
    let mut deadline = Instant::now() + config.pong_wait;

    loop {
        let frame = match tokio::time::timeout_at(deadline, reader.read_frame()).await {
            Err(_) => {
                info!(user_id = %identity.user_id, "no pong within deadline, dropping connection");
                break;
            }
            Ok(None) => {
                debug!(user_id = %identity.user_id, "peer went away");
                break;
            }
            Ok(Some(Err(e))) => {
                warn!(user_id = %identity.user_id, "read failed: {e}");
                break;
            }
            Ok(Some(Ok(frame))) => frame,
        };

        let payload = match frame {
            Frame::Pong => {
                deadline = Instant::now() + config.pong_wait;
                continue;
            }
            // Pongs to peer pings are answered by the websocket layer
            Frame::Ping => continue,
            Frame::Close => {
                debug!(user_id = %identity.user_id, "peer sent close");
                break;
            }
            Frame::Text(text) => text.into_bytes(),
            Frame::Binary(bytes) => bytes,
        };

        if payload.len() > config.max_frame_size {
            warn!(
                user_id = %identity.user_id,
                size = payload.len(),
                limit = config.max_frame_size,
                "frame too large, dropping connection"
            );
            break;
        }

        let message = match decode_inbound(&payload, &identity) {
            Ok(message) => message,
            Err(e) => {
                warn!(user_id = %identity.user_id, "ignoring malformed message: {e}");
                continue;
            }
        };

        match directory.find(&identity.project_id).await {
            Some(room) => {
                if let Err(e) = room.broadcast(message) {
                    debug!(user_id = %identity.user_id, "message dropped: {e}");
                }
            }
            None => debug!(project_id = %identity.project_id, "room gone, message dropped"),
        }
    }
}

/// Write queued messages and pings until the outbox closes or a write fails.
pub(crate) async fn write_pump<W: FrameWriter>(
    mut writer: W,
    mut outbox: Outbox,
    config: RealtimeConfig,
) {
    let mut ticker =
        tokio::time::interval_at(Instant::now() + config.ping_period, config.ping_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            next = outbox.recv() => {
                let Some(first) = next else {
                    if let Err(e) = write_within(&mut writer, Frame::Close, config.write_wait).await {
                        debug!("close frame not delivered: {e}");
                    }
                    return;
                };

                if let Err(e) = write_within(&mut writer, Frame::Text(first.to_string()), config.write_wait).await {
                    warn!("write failed: {e}");
                    return;
                }
                // Flush whatever else is already queued before waiting again
                while let Ok(queued) = outbox.try_recv() {
                    if let Err(e) = write_within(&mut writer, Frame::Text(queued.to_string()), config.write_wait).await {
                        warn!("write failed: {e}");
                        return;
                    }
                }
            }
            _ = ticker.tick() => {
                if let Err(e) = write_within(&mut writer, Frame::Ping, config.write_wait).await {
                    debug!("ping failed: {e}");
                    return;
                }
            }
        }
    }
}

async fn write_within<W: FrameWriter>(
    writer: &mut W,
    frame: Frame,
    wait: Duration,
) -> Result<(), TransportError> {
    tokio::time::timeout(wait, writer.write_frame(frame))
        .await
        .map_err(|_| TransportError::WriteTimeout)?
}
