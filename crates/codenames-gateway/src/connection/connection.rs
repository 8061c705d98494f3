//! Individual WebSocket connection
//!
//! The handle other components hold for one upgraded socket. Frames are queued
//! on a bounded channel drained by the connection's writer task; the reader
//! task reports pongs back through `record_pong`.

use crate::protocol::{CloseCode, ServerMessage};
use chrono::{DateTime, Utc};
use codenames_core::SessionId;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Frames queued for the writer task
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Message(ServerMessage),
    Ping(Vec<u8>),
    Close(CloseCode),
}

/// Failures delivering to a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    #[error("Outbound buffer full")]
    BufferFull,

    #[error("Connection closed")]
    Closed,
}

impl<T> From<mpsc::error::TrySendError<T>> for ConnectionError {
    fn from(err: mpsc::error::TrySendError<T>) -> Self {
        match err {
            mpsc::error::TrySendError::Full(_) => Self::BufferFull,
            mpsc::error::TrySendError::Closed(_) => Self::Closed,
        }
    }
}

/// A single WebSocket connection
pub struct Connection {
    /// Unique per upgrade, distinguishes reconnects of the same member
    id: Uuid,

    /// Channel to the writer task
    sender: mpsc::Sender<Outbound>,

    /// Shared by the reader, writer and liveness tasks
    cancel: CancellationToken,

    last_seen: RwLock<DateTime<Utc>>,

    /// Sequence of the last ping sent
    ping_seq: AtomicU64,

    /// Highest ping sequence echoed back
    pong_seq: watch::Sender<u64>,

    /// Session this connection has joined
    session: Mutex<Option<SessionId>>,

    /// Code passed to the first `close`
    closed_with: Mutex<Option<CloseCode>>,

    created_at: Instant,
}

impl Connection {
    /// Create a new connection
    pub fn new(sender: mpsc::Sender<Outbound>, cancel: CancellationToken) -> Arc<Self> {
        let (pong_seq, _) = watch::channel(0);
        Arc::new(Self {
            id: Uuid::new_v4(),
            sender,
            cancel,
            last_seen: RwLock::new(Utc::now()),
            ping_seq: AtomicU64::new(0),
            pong_seq,
            session: Mutex::new(None),
            closed_with: Mutex::new(None),
            created_at: Instant::now(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Check if the connection has been closed or its writer is gone
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.sender.is_closed()
    }

    /// Queue a message without waiting for buffer space
    pub fn send(&self, message: ServerMessage) -> Result<(), ConnectionError> {
        if self.cancel.is_cancelled() {
            return Err(ConnectionError::Closed);
        }
        self.sender.try_send(Outbound::Message(message))?;
        Ok(())
    }

    /// Queue a close frame and stop all connection tasks. Only the first call
    /// has any effect.
    pub fn close(&self, code: CloseCode) {
        {
            let mut closed_with = self.closed_with.lock();
            if closed_with.is_some() || self.cancel.is_cancelled() {
                return;
            }
            *closed_with = Some(code);
        }
        if let Err(e) = self.sender.try_send(Outbound::Close(code)) {
            tracing::debug!(connection_id = %self.id, error = %e, "Close frame not queued");
        }
        self.cancel.cancel();
        tracing::debug!(connection_id = %self.id, code = code.as_u16(), "Connection closed");
    }

    /// Code this connection was closed with, if `close` was called
    pub fn close_code(&self) -> Option<CloseCode> {
        *self.closed_with.lock()
    }

    /// Queue a ping and return its sequence number
    pub fn ping(&self) -> Result<u64, ConnectionError> {
        if self.cancel.is_cancelled() {
            return Err(ConnectionError::Closed);
        }
        let seq = self.ping_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.sender
            .try_send(Outbound::Ping(seq.to_be_bytes().to_vec()))?;
        Ok(seq)
    }

    /// Record a pong payload received by the reader
    pub fn record_pong(&self, payload: &[u8]) {
        let Ok(bytes) = <[u8; 8]>::try_from(payload) else {
            tracing::trace!(connection_id = %self.id, "Ignoring unsolicited pong");
            return;
        };
        let seq = u64::from_be_bytes(bytes);
        self.pong_seq.send_if_modified(|current| {
            if seq > *current {
                *current = seq;
                true
            } else {
                false
            }
        });
    }

    /// Wait until the pong for `seq` (or a later one) arrives
    pub async fn wait_for_pong(&self, seq: u64) -> Result<(), ConnectionError> {
        let mut pongs = self.pong_seq.subscribe();
        pongs
            .wait_for(|echoed| *echoed >= seq)
            .await
            .map(|_| ())
            .map_err(|_| ConnectionError::Closed)
    }

    /// Highest ping sequence the peer has echoed
    pub fn last_pong(&self) -> u64 {
        *self.pong_seq.borrow()
    }

    pub fn last_seen(&self) -> DateTime<Utc> {
        *self.last_seen.read()
    }

    /// Mark the peer as alive now
    pub fn touch(&self) {
        *self.last_seen.write() = Utc::now();
    }

    pub fn joined_session(&self) -> Option<SessionId> {
        *self.session.lock()
    }

    pub fn set_joined_session(&self, session_id: Option<SessionId>) {
        *self.session.lock() = session_id;
    }

    /// Get connection age
    pub fn age(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("session", &self.joined_session())
            .field("closed", &self.is_closed())
            .field("last_pong", &self.last_pong())
            .finish_non_exhaustive()
    }
}
