//! Handler error types

use crate::protocol::{ProtocolError, ServerMessage};
use crate::session::SessionError;
use codenames_core::SessionId;
use thiserror::Error;

/// Handler error type
///
/// Every variant is answered with an `error` message to the sender only.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A connection plays in one session at a time
    #[error("Already in session {current}, leave it before joining {requested}")]
    AlreadyJoined {
        current: SessionId,
        requested: SessionId,
    },

    #[error("Not in session {0}")]
    NotInSession(SessionId),

    #[error("Not in any session")]
    NotJoined,

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl HandlerError {
    /// Short description sent as the error message
    #[must_use]
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Protocol(_) => "Invalid message",
            Self::AlreadyJoined { .. } | Self::NotInSession(_) | Self::NotJoined => {
                "Request not allowed"
            }
            Self::Session(_) => "Session operation failed",
        }
    }

    /// The `error` message answering this failure
    #[must_use]
    pub fn to_message(&self, session_id: Option<SessionId>) -> ServerMessage {
        ServerMessage::error(session_id, self.summary(), Some(self))
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
