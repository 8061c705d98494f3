//! WebSocket handler
//!
//! Each upgraded socket runs three tasks sharing one cancellation token: the
//! reader (this task), a writer draining the connection's outbound queue, and
//! the liveness monitor.

use crate::auth::Authenticated;
use crate::connection::{Connection, Outbound};
use crate::handlers::{DisconnectHandler, HandlerError, MessageDispatcher};
use crate::protocol::{CloseCode, ProtocolError};
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use codenames_common::Identity;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Channel buffer size for outgoing frames
const MESSAGE_BUFFER_SIZE: usize = 100;

/// WebSocket gateway handler
///
/// The identity is verified before the upgrade; a bad token is a 401.
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    Authenticated(identity): Authenticated,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, identity, socket))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, identity: Identity, socket: WebSocket) {
    let (tx, rx) = mpsc::channel::<Outbound>(MESSAGE_BUFFER_SIZE);
    let cancel = state.shutdown_token().child_token();
    let connection = Connection::new(tx, cancel.clone());
    let member_id = identity.member_id;

    tracing::info!(
        connection_id = %connection.id(),
        member_id = %member_id,
        "WebSocket connection established"
    );

    let (ws_sink, mut ws_stream) = socket.split();
    let send_task = tokio::spawn(write_frames(ws_sink, rx, cancel.clone(), connection.id()));

    let liveness_task = {
        let monitor = state.liveness();
        let registry = state.registry().clone();
        let connection = connection.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let on_failure = {
                let connection = connection.clone();
                move || async move {
                    DisconnectHandler::handle(
                        &registry,
                        member_id,
                        &connection,
                        CloseCode::LivenessTimeout,
                    )
                    .await;
                }
            };
            monitor.run(connection.as_ref(), &cancel, on_failure).await
        })
    };

    loop {
        let frame = tokio::select! {
            () = cancel.cancelled() => break,
            frame = ws_stream.next() => frame,
        };

        match frame {
            Some(Ok(Message::Text(text))) => {
                MessageDispatcher::dispatch_text(&state, &identity, &connection, &text).await;
            }
            Some(Ok(Message::Pong(payload))) => connection.record_pong(&payload),
            Some(Ok(Message::Ping(_))) => {
                // Answered by axum
                tracing::trace!(connection_id = %connection.id(), "Ping received");
            }
            Some(Ok(Message::Binary(_))) => {
                MessageDispatcher::reply_error(&connection, &HandlerError::from(ProtocolError::Binary));
            }
            Some(Ok(Message::Close(_))) | None => {
                tracing::info!(connection_id = %connection.id(), "Client closed connection");
                break;
            }
            Some(Err(e)) => {
                tracing::warn!(connection_id = %connection.id(), error = %e, "WebSocket error");
                break;
            }
        }
    }

    DisconnectHandler::handle(state.registry(), member_id, &connection, CloseCode::Normal).await;
    cancel.cancel();

    match liveness_task.await {
        Ok(outcome) => {
            tracing::debug!(connection_id = %connection.id(), ?outcome, "Liveness monitor stopped");
        }
        Err(e) => {
            tracing::error!(connection_id = %connection.id(), error = %e, "Liveness task panicked");
        }
    }
    if send_task.await.is_err() {
        tracing::warn!(connection_id = %connection.id(), "Writer task panicked");
    }

    tracing::info!(
        connection_id = %connection.id(),
        member_id = %member_id,
        age_ms = connection.age().as_millis(),
        last_seen = %connection.last_seen(),
        close_code = ?connection.close_code(),
        "WebSocket connection closed"
    );
}

/// Drain the outbound queue into the socket.
///
/// Frames queued before cancellation are still written. A connection
/// cancelled without a close frame of its own (server shutdown) gets
/// `GoingAway`.
async fn write_frames(
    mut sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<Outbound>,
    cancel: CancellationToken,
    connection_id: Uuid,
) {
    loop {
        let frame = tokio::select! {
            biased;
            frame = rx.recv() => frame,
            () = cancel.cancelled() => Some(Outbound::Close(CloseCode::GoingAway)),
        };
        let Some(frame) = frame else {
            break;
        };

        match write_frame(&mut sink, frame).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                tracing::warn!(connection_id = %connection_id, error = %e, "Failed to write to WebSocket");
                cancel.cancel();
                return;
            }
        }
    }

    if let Err(e) = sink.close().await {
        tracing::trace!(connection_id = %connection_id, error = %e, "WebSocket already closed");
    }
}

/// Write one frame. Returns `false` once a close frame has been sent.
async fn write_frame(
    sink: &mut SplitSink<WebSocket, Message>,
    frame: Outbound,
) -> Result<bool, axum::Error> {
    match frame {
        Outbound::Message(message) => {
            match message.to_json() {
                Ok(json) => sink.send(Message::Text(json)).await?,
                Err(e) => tracing::error!(error = %e, %message, "Failed to encode message"),
            }
            Ok(true)
        }
        Outbound::Ping(payload) => {
            sink.send(Message::Ping(payload)).await?;
            Ok(true)
        }
        Outbound::Close(code) => {
            let frame = CloseFrame {
                code: code.as_u16(),
                reason: code.description().into(),
            };
            sink.send(Message::Close(Some(frame))).await?;
            Ok(false)
        }
    }
}
