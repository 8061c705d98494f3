//! Connection teardown
//!
//! Shared by `leave_session`, liveness failures and socket teardown. Any of
//! them may run more than once for the same connection.

use crate::connection::Connection;
use crate::protocol::CloseCode;
use crate::session::SessionRegistry;
use codenames_core::MemberId;
use std::sync::Arc;

pub struct DisconnectHandler;

impl DisconnectHandler {
    /// Close `connection` with `code` and remove its member from the joined
    /// session. Returns whether a member was removed.
    pub async fn handle(
        registry: &SessionRegistry,
        member_id: MemberId,
        connection: &Arc<Connection>,
        code: CloseCode,
    ) -> bool {
        connection.close(code);

        let Some(session_id) = connection.joined_session() else {
            return false;
        };
        connection.set_joined_session(None);

        let Some(session) = registry.get(session_id) else {
            return false;
        };
        let removed = session.remove_connection(member_id, connection.id(), code).await;
        if removed {
            tracing::info!(
                session_id = %session_id,
                member_id = %member_id,
                code = code.as_u16(),
                "Member disconnected"
            );
        }
        removed
    }
}
