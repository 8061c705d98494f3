//! WebSocket test client
//!
//! Speaks the gateway envelope protocol. Reading also answers the server's
//! liveness pings, so a client that stops reading eventually gets evicted.

use std::time::Duration;

use anyhow::{bail, Result};
use codenames_core::{GameState, SessionId};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// How long to wait for any single expected frame
const RECV_TIMEOUT: Duration = Duration::from_secs(10);

pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

/// What the server sent when it closed the socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Closed {
    Code(u16),
    WithoutFrame,
}

impl WsClient {
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _) = connect_async(url).await?;
        Ok(Self { stream })
    }

    pub async fn send_json(&mut self, value: Value) -> Result<()> {
        self.stream.send(Message::Text(value.to_string())).await?;
        Ok(())
    }

    pub async fn send_text(&mut self, text: &str) -> Result<()> {
        self.stream.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    pub async fn join(&mut self, session_id: SessionId) -> Result<()> {
        self.send_json(json!({"type": "join_session", "session_id": session_id}))
            .await
    }

    pub async fn leave(&mut self) -> Result<()> {
        self.send_json(json!({"type": "leave_session"})).await
    }

    /// Next envelope from the server
    pub async fn next_json(&mut self) -> Result<Value> {
        loop {
            let frame = tokio::time::timeout(RECV_TIMEOUT, self.stream.next()).await?;
            match frame {
                Some(Ok(Message::Text(text))) => return Ok(serde_json::from_str(&text)?),
                Some(Ok(Message::Close(frame))) => bail!("Connection closed: {frame:?}"),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => bail!("Connection ended"),
            }
        }
    }

    /// Skip ahead to the next envelope of type `kind`
    pub async fn next_of_type(&mut self, kind: &str) -> Result<Value> {
        loop {
            let envelope = self.next_json().await?;
            if envelope["type"] == kind {
                return Ok(envelope);
            }
        }
    }

    /// Skip ahead to a snapshot accepted by `check`
    pub async fn snapshot_where(&mut self, check: impl Fn(&GameState) -> bool) -> Result<GameState> {
        loop {
            let envelope = self.next_of_type("state_snapshot").await?;
            let state: GameState = serde_json::from_value(envelope["data"].clone())?;
            if check(&state) {
                return Ok(state);
            }
        }
    }

    /// Read until the server closes the socket
    pub async fn closed(&mut self) -> Result<Closed> {
        loop {
            let frame = tokio::time::timeout(RECV_TIMEOUT, self.stream.next()).await?;
            match frame {
                Some(Ok(Message::Close(Some(frame)))) => return Ok(Closed::Code(frame.code.into())),
                Some(Ok(Message::Close(None))) | None => return Ok(Closed::WithoutFrame),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}
