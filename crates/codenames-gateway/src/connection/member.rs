//! Session member
//!
//! A connected participant as seen by a session.

use super::Connection;
use codenames_common::Identity;
use codenames_core::{MemberId, PlayerSummary, SessionId};
use std::sync::Arc;

/// One connected participant of a session
#[derive(Debug, Clone)]
pub struct Member {
    id: MemberId,
    name: String,
    session_id: SessionId,
    connection: Arc<Connection>,
}

impl Member {
    pub fn new(identity: &Identity, session_id: SessionId, connection: Arc<Connection>) -> Self {
        Self {
            id: identity.member_id,
            name: identity.name.clone(),
            session_id,
            connection,
        }
    }

    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    /// Public projection stored in rosters and sent to clients
    pub fn summary(&self) -> PlayerSummary {
        PlayerSummary::new(self.id, self.name.clone())
    }
}
