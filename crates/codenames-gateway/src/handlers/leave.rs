//! `leave_session` handler

use super::{DisconnectHandler, HandlerError, HandlerResult};
use crate::connection::Connection;
use crate::protocol::CloseCode;
use crate::server::GatewayState;
use codenames_common::Identity;
use codenames_core::SessionId;
use std::sync::Arc;

/// Handles `leave_session` messages
pub struct LeaveHandler;

impl LeaveHandler {
    /// Leave the joined session and close the connection.
    ///
    /// `requested` defaults to the joined session.
    pub async fn handle(
        state: &GatewayState,
        identity: &Identity,
        connection: &Arc<Connection>,
        requested: Option<SessionId>,
    ) -> HandlerResult<()> {
        let current = connection.joined_session().ok_or(HandlerError::NotJoined)?;
        if let Some(requested) = requested.filter(|id| *id != current) {
            return Err(HandlerError::NotInSession(requested));
        }

        DisconnectHandler::handle(
            state.registry(),
            identity.member_id,
            connection,
            CloseCode::Normal,
        )
        .await;
        Ok(())
    }
}
