//! Integration test utilities for the gateway
//!
//! Starts a real gateway on an ephemeral port, backed by the in-memory state
//! store, and drives it over HTTP and WebSocket.

pub mod client;
pub mod helpers;

pub use client::*;
pub use helpers::*;
