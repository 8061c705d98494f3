//! Gateway message format
//!
//! Every frame is a JSON envelope `{type, data, session_id?}`. The envelope is
//! decoded first, then its `data` is decoded according to `type`.

use super::{MessageType, UnknownMessageType};
use codenames_core::{GameState, PlayerSummary, SessionId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Type tag, kept raw so unknown tags can be reported
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub data: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
}

impl Envelope {
    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(json).map_err(ProtocolError::Malformed)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// The parsed type tag
    pub fn message_type(&self) -> Result<MessageType, ProtocolError> {
        Ok(self.kind.parse()?)
    }
}

/// Errors decoding client frames
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error(transparent)]
    UnknownType(#[from] UnknownMessageType),

    #[error("Message type {0} cannot be sent by clients")]
    ServerOnly(MessageType),

    #[error("Message type {0} requires a session_id")]
    MissingSessionId(MessageType),

    #[error("Invalid {kind} payload: {source}")]
    InvalidPayload {
        kind: MessageType,
        #[source]
        source: serde_json::Error,
    },

    #[error("Binary frames are not supported")]
    Binary,
}

/// Optional body of `join_session`
#[derive(Debug, Clone, Default, Deserialize)]
struct JoinPayload {
    session_id: Option<SessionId>,
}

/// Messages clients may send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
    JoinSession { session_id: SessionId },
    /// `session_id` defaults to the session the connection is in
    LeaveSession { session_id: Option<SessionId> },
}

impl ClientMessage {
    /// Decode a client frame
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        Self::from_envelope(Envelope::from_json(json)?)
    }

    /// Decode the payload of an already-parsed envelope
    pub fn from_envelope(envelope: Envelope) -> Result<Self, ProtocolError> {
        let kind = envelope.message_type()?;
        match kind {
            MessageType::JoinSession => {
                let payload: JoinPayload = if envelope.data.is_null() {
                    JoinPayload::default()
                } else {
                    serde_json::from_value(envelope.data)
                        .map_err(|source| ProtocolError::InvalidPayload { kind, source })?
                };
                let session_id = envelope
                    .session_id
                    .or(payload.session_id)
                    .ok_or(ProtocolError::MissingSessionId(kind))?;
                Ok(Self::JoinSession { session_id })
            }
            MessageType::LeaveSession => Ok(Self::LeaveSession {
                session_id: envelope.session_id,
            }),
            other => Err(ProtocolError::ServerOnly(other)),
        }
    }

    #[must_use]
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::JoinSession { .. } => MessageType::JoinSession,
            Self::LeaveSession { .. } => MessageType::LeaveSession,
        }
    }
}

/// Body of an `error` message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
    /// Underlying cause, when there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Messages the server sends
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    StateSnapshot {
        session_id: SessionId,
        state: Box<GameState>,
    },
    MemberJoined {
        session_id: SessionId,
        member: PlayerSummary,
    },
    MemberLeft {
        session_id: SessionId,
        member: PlayerSummary,
    },
    Error {
        session_id: Option<SessionId>,
        payload: ErrorPayload,
    },
}

impl ServerMessage {
    pub fn snapshot(session_id: SessionId, state: GameState) -> Self {
        Self::StateSnapshot {
            session_id,
            state: Box::new(state),
        }
    }

    /// An error message carrying an optional cause
    pub fn error(
        session_id: Option<SessionId>,
        message: impl Into<String>,
        cause: Option<&dyn std::error::Error>,
    ) -> Self {
        Self::Error {
            session_id,
            payload: ErrorPayload {
                message: message.into(),
                error: cause.map(ToString::to_string),
            },
        }
    }

    #[must_use]
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::StateSnapshot { .. } => MessageType::StateSnapshot,
            Self::MemberJoined { .. } => MessageType::MemberJoined,
            Self::MemberLeft { .. } => MessageType::MemberLeft,
            Self::Error { .. } => MessageType::Error,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            Self::StateSnapshot { session_id, .. }
            | Self::MemberJoined { session_id, .. }
            | Self::MemberLeft { session_id, .. } => Some(*session_id),
            Self::Error { session_id, .. } => *session_id,
        }
    }

    /// Build the wire envelope
    pub fn to_envelope(&self) -> Result<Envelope, serde_json::Error> {
        let data = match self {
            Self::StateSnapshot { state, .. } => serde_json::to_value(state)?,
            Self::MemberJoined { member, .. } | Self::MemberLeft { member, .. } => {
                serde_json::to_value(member)?
            }
            Self::Error { payload, .. } => serde_json::to_value(payload)?,
        };
        Ok(Envelope {
            kind: self.message_type().as_str().to_string(),
            data,
            session_id: self.session_id(),
        })
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        self.to_envelope()?.to_json()
    }
}

impl std::fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.session_id() {
            Some(id) => write!(f, "ServerMessage(type={}, session={id})", self.message_type()),
            None => write!(f, "ServerMessage(type={})", self.message_type()),
        }
    }
}
