//! # codenames-gateway
//!
//! WebSocket gateway coordinating live game sessions.
//!
//! Members authenticate before the upgrade, join a session by id, and receive
//! roster changes and state snapshots as other members come and go. Dead
//! connections are found by the liveness monitor and evicted.

pub mod auth;
pub mod connection;
pub mod handlers;
pub mod liveness;
pub mod protocol;
pub mod response;
pub mod server;
pub mod session;

pub use server::{create_app, create_gateway_state, create_router, run, run_server, GatewayState};
pub use session::{Session, SessionError, SessionRegistry};
