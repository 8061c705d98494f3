//! Health check handlers

use crate::server::GatewayState;
use crate::session::RegistryStats;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub registry: RegistryStats,
}

/// Liveness plus a snapshot of who is connected where
///
/// GET /health
pub async fn health_check(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        registry: state.registry().stats(),
    })
}
