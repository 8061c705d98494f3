//! Game sessions
//!
//! A session groups the connections playing one game and keeps the roster in
//! the state store in step with them.

mod registry;
mod session;

pub use registry::{RegistryStats, SessionRegistry};
pub use session::{Session, SessionError};
