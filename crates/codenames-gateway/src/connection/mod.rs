//! Connection management
//!
//! WebSocket connection handles and the members built on them.

mod connection;
mod member;

pub use connection::{Connection, ConnectionError, Outbound};
pub use member::Member;
