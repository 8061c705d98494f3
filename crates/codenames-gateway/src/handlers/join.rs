//! `join_session` handler

use super::{HandlerError, HandlerResult};
use crate::connection::{Connection, Member};
use crate::server::GatewayState;
use crate::session::SessionError;
use codenames_common::Identity;
use codenames_core::SessionId;
use std::sync::Arc;

/// Handles `join_session` messages
pub struct JoinHandler;

impl JoinHandler {
    pub async fn handle(
        state: &GatewayState,
        identity: &Identity,
        connection: &Arc<Connection>,
        session_id: SessionId,
    ) -> HandlerResult<()> {
        if let Some(current) = connection.joined_session() {
            if current != session_id {
                return Err(HandlerError::AlreadyJoined {
                    current,
                    requested: session_id,
                });
            }
        }

        let member = Member::new(identity, session_id, Arc::clone(connection));
        match state.registry().admit(session_id, member).await {
            Ok(_) => {
                connection.set_joined_session(Some(session_id));
                Ok(())
            }
            // The member is registered and the session has already been told
            Err(SessionError::Store(e)) => {
                tracing::debug!(
                    session_id = %session_id,
                    member_id = %identity.member_id,
                    error = %e,
                    "Joined with state store failure"
                );
                connection.set_joined_session(Some(session_id));
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
