//! WebSocket close codes
//!
//! Defines gateway-specific close codes for WebSocket connections.

use serde::{Deserialize, Serialize};

/// Gateway WebSocket close codes
///
/// These codes are sent when closing a WebSocket connection to indicate the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Member left the session
    Normal = 1000,
    /// Server is shutting down
    GoingAway = 1001,
    /// Outbound buffer overflowed or a send failed
    SendFailed = 4008,
    /// Liveness probe went unanswered
    LivenessTimeout = 4009,
    /// Same member joined again from another connection
    Replaced = 4011,
}

impl CloseCode {
    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Get the description for this close code
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Normal => "Left the session",
            Self::GoingAway => "Server shutting down",
            Self::SendFailed => "Failed to deliver messages",
            Self::LivenessTimeout => "Failed ping response",
            Self::Replaced => "Replaced by a newer connection",
        }
    }

    /// Get the name of this close code
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::GoingAway => "GoingAway",
            Self::SendFailed => "SendFailed",
            Self::LivenessTimeout => "LivenessTimeout",
            Self::Replaced => "Replaced",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.as_u16(), self.description())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}
