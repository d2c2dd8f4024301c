//! Persistent WebSocket channel (`GET /ws`).
//!
//! The socket is split in two: a writer task drains the connection's
//! outbound queue into the sink, while the read loop feeds text frames to
//! the connection's [`Session`].

pub mod protocol;
pub mod session;

use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::Instrument;

use rentalhub_app::ports::{
    AssignmentRepository, DeviceRepository, OwnerRepository, PropertyRepository,
};

use crate::state::AppState;
use protocol::ServerMessage;
use session::Session;

/// Frames queued for a connection before its own producers wait.
const OUTBOUND_CAPACITY: usize = 64;

static NEXT_CONNECTION: AtomicU64 = AtomicU64::new(1);

/// `GET /ws`
pub async fn upgrade<DR, OR, PR, AR>(
    ws: WebSocketUpgrade,
    State(state): State<AppState<DR, OR, PR, AR>>,
) -> Response
where
    DR: DeviceRepository + Send + Sync + 'static,
    OR: OwnerRepository + Send + Sync + 'static,
    PR: PropertyRepository + Send + Sync + 'static,
    AR: AssignmentRepository + Send + Sync + 'static,
{
    let connection = NEXT_CONNECTION.fetch_add(1, Ordering::Relaxed);
    ws.on_upgrade(move |socket| {
        serve(socket, state).instrument(tracing::info_span!("ws", connection))
    })
}

async fn serve<DR, OR, PR, AR>(socket: WebSocket, state: AppState<DR, OR, PR, AR>)
where
    DR: DeviceRepository + Send + Sync + 'static,
    OR: OwnerRepository + Send + Sync + 'static,
    PR: PropertyRepository + Send + Sync + 'static,
    AR: AssignmentRepository + Send + Sync + 'static,
{
    tracing::info!("websocket connected");
    let (mut sink, mut stream) = socket.split();
    let (outbound, mut queue) = mpsc::channel::<ServerMessage>(OUTBOUND_CAPACITY);

    let writer = tokio::spawn(
        async move {
            while let Some(message) = queue.recv().await {
                let text = match serde_json::to_string(&message) {
                    Ok(text) => text,
                    Err(err) => {
                        tracing::warn!(%err, "failed to serialize websocket frame");
                        continue;
                    }
                };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
        .in_current_span(),
    );

    let mut session = Session::new(state, outbound);
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => session.handle_text(text.as_str()).await,
            Ok(Message::Binary(data)) => match std::str::from_utf8(&data) {
                Ok(text) => session.handle_text(text).await,
                Err(_) => session.reject("binary frames must carry UTF-8 JSON").await,
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(_) | Message::Pong(_)) => {}
            Err(err) => {
                tracing::debug!(%err, "websocket receive failed");
                break;
            }
        }
    }

    drop(session);
    writer.abort();
    tracing::info!("websocket disconnected");
}
