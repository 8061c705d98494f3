//! Client message handlers
//!
//! Handles incoming WebSocket messages based on their type.

mod disconnect;
mod error;
mod join;
mod leave;

pub use disconnect::DisconnectHandler;
pub use error::{HandlerError, HandlerResult};
pub use join::JoinHandler;
pub use leave::LeaveHandler;

use crate::connection::Connection;
use crate::protocol::ClientMessage;
use crate::server::GatewayState;
use codenames_common::Identity;
use std::sync::Arc;

/// Dispatch incoming client messages to appropriate handlers
pub struct MessageDispatcher;

impl MessageDispatcher {
    /// Decode and handle one text frame. Failures are answered to the sender
    /// only.
    pub async fn dispatch_text(
        state: &GatewayState,
        identity: &Identity,
        connection: &Arc<Connection>,
        text: &str,
    ) {
        let result = match ClientMessage::from_json(text) {
            Ok(message) => Self::dispatch(state, identity, connection, message).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            Self::reply_error(connection, &e);
        }
    }

    /// Handle a decoded client message
    pub async fn dispatch(
        state: &GatewayState,
        identity: &Identity,
        connection: &Arc<Connection>,
        message: ClientMessage,
    ) -> HandlerResult<()> {
        tracing::trace!(
            connection_id = %connection.id(),
            member_id = %identity.member_id,
            message_type = %message.message_type(),
            "Received message"
        );

        match message {
            ClientMessage::JoinSession { session_id } => {
                JoinHandler::handle(state, identity, connection, session_id).await
            }
            ClientMessage::LeaveSession { session_id } => {
                LeaveHandler::handle(state, identity, connection, session_id).await
            }
        }
    }

    /// Send `err` back to the connection that caused it
    pub fn reply_error(connection: &Connection, err: &HandlerError) {
        tracing::debug!(connection_id = %connection.id(), error = %err, "Rejected client message");
        if let Err(e) = connection.send(err.to_message(connection.joined_session())) {
            tracing::debug!(connection_id = %connection.id(), error = %e, "Error reply not delivered");
        }
    }
}
