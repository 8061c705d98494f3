//! Game creation and lookup
//!
//! A game's state document must exist before anyone can join its session.

use crate::auth::Authenticated;
use crate::response::{ApiResult, Created};
use crate::server::GatewayState;
use axum::{
    extract::{Path, State},
    Json,
};
use codenames_core::{GameState, SessionId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGameResponse {
    pub game_id: SessionId,
}

/// Seed a new game hosted by the caller
///
/// POST /games
pub async fn create_game(
    State(state): State<GatewayState>,
    Authenticated(identity): Authenticated,
) -> ApiResult<Created<Json<CreateGameResponse>>> {
    let settings = state.config().game.settings();
    let game = {
        let mut rng = rand::thread_rng();
        GameState::initial(&mut rng, identity.member_id, state.wordpack(), &settings)?
    };

    let game_id = SessionId::new();
    state.games().create(game_id, &game).await?;

    tracing::info!(
        session_id = %game_id,
        host_id = %identity.member_id,
        wordpack_id = game.wordpack_id,
        "Game created"
    );

    Ok(Created(Json(CreateGameResponse { game_id })))
}

/// Read the current state document
///
/// GET /games/:game_id
pub async fn get_game(
    State(state): State<GatewayState>,
    Authenticated(_): Authenticated,
    Path(game_id): Path<SessionId>,
) -> ApiResult<Json<GameState>> {
    Ok(Json(state.games().fetch(game_id).await?))
}
