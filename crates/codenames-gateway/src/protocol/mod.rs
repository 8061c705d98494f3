//! Gateway protocol definitions
//!
//! Defines the message envelope, type tags, typed payloads, and close codes.

mod close_codes;
mod message_type;
mod messages;

pub use close_codes::CloseCode;
pub use message_type::{MessageType, UnknownMessageType};
pub use messages::{ClientMessage, Envelope, ErrorPayload, ProtocolError, ServerMessage};
