//! Message type tags
//!
//! The `type` field of every envelope exchanged over the gateway.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Envelope type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Join a session (client only)
    JoinSession,
    /// Leave the current session (client only)
    LeaveSession,
    /// Full game-state document (server only)
    StateSnapshot,
    /// A member joined the session (server only)
    MemberJoined,
    /// A member left the session (server only)
    MemberLeft,
    /// Something went wrong (server only)
    Error,
}

impl MessageType {
    pub const ALL: [MessageType; 6] = [
        Self::JoinSession,
        Self::LeaveSession,
        Self::StateSnapshot,
        Self::MemberJoined,
        Self::MemberLeft,
        Self::Error,
    ];

    /// Wire name of this type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::JoinSession => "join_session",
            Self::LeaveSession => "leave_session",
            Self::StateSnapshot => "state_snapshot",
            Self::MemberJoined => "member_joined",
            Self::MemberLeft => "member_left",
            Self::Error => "error",
        }
    }

    /// Check if clients may send this type
    #[must_use]
    pub const fn is_client_type(self) -> bool {
        matches!(self, Self::JoinSession | Self::LeaveSession)
    }

    /// Check if only the server sends this type
    #[must_use]
    pub const fn is_server_type(self) -> bool {
        !self.is_client_type()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = UnknownMessageType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownMessageType(s.to_string()))
    }
}

/// A `type` tag outside the protocol
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown message type: {0}")]
pub struct UnknownMessageType(pub String);
