//! Gateway server setup
//!
//! Provides the router, state construction and the serve loop.

mod games;
mod handler;
mod health;
mod state;

pub use games::{create_game, get_game, CreateGameResponse};
pub use handler::gateway_handler;
pub use health::{health_check, HealthResponse};
pub use state::GatewayState;

use crate::auth::JwtIdentityVerifier;
use axum::{
    routing::{get, post},
    Router,
};
use codenames_common::{AppConfig, AppError, GameConfig, JwtService, StoreBackend};
use codenames_core::Wordpack;
use codenames_store::{
    GameStateRepository, MemoryStateStore, RedisPool, RedisStateStore, StateStore,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/gateway", get(gateway_handler))
        .route("/games", post(create_game))
        .route("/games/:game_id", get(get_game))
        .route("/health", get(health_check))
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize all dependencies and create `GatewayState`
pub async fn create_gateway_state(config: AppConfig) -> Result<GatewayState, AppError> {
    let store: Arc<dyn StateStore> = match config.store.backend {
        StoreBackend::Redis => {
            let redis = config.store.redis.as_ref().ok_or_else(|| {
                AppError::Config("REDIS_URL is required for the redis state store".to_string())
            })?;

            tracing::info!("Connecting to Redis...");
            let pool = RedisPool::from_config(redis).map_err(|e| AppError::Store(e.to_string()))?;
            pool.health_check()
                .await
                .map_err(|e| AppError::Store(e.to_string()))?;
            tracing::info!("Redis connection established");

            Arc::new(
                RedisStateStore::new(Arc::new(pool))
                    .with_ttl(config.store.game_state_ttl_seconds),
            )
        }
        StoreBackend::Memory => {
            if config.app.env.is_production() {
                tracing::warn!("Using the in-memory state store in production, game state will not survive a restart");
            } else {
                tracing::info!("Using the in-memory state store");
            }
            Arc::new(MemoryStateStore::new())
        }
    };

    let wordpack = load_wordpack(&config.game).await?;
    tracing::info!(
        wordpack_id = wordpack.id,
        words = wordpack.words.len(),
        "Wordpack loaded"
    );

    let verifier = Arc::new(JwtIdentityVerifier::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.token_expiry,
    )));

    Ok(GatewayState::new(
        GameStateRepository::new(store),
        verifier,
        wordpack,
        config,
    ))
}

async fn load_wordpack(config: &GameConfig) -> Result<Wordpack, AppError> {
    let Some(path) = config.wordpack_path.as_deref() else {
        return Ok(Wordpack::bundled());
    };
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::Config(format!("Failed to read wordpack {path}: {e}")))?;
    Wordpack::from_json(&json)
        .map_err(|e| AppError::Config(format!("Invalid wordpack {path}: {e}")))
}

/// Serve `app` on `listener` until `shutdown` is cancelled
pub async fn run_server(
    app: Router,
    listener: TcpListener,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Gateway listening on ws://{}/gateway", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    tracing::info!("Gateway stopped");
    Ok(())
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.gateway.address();

    let state = create_gateway_state(config).await?;
    let shutdown = state.shutdown_token().clone();
    let app = create_app(state);

    tracing::info!("Starting Gateway server on {}", addr);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    tokio::spawn(shutdown_on_signal(shutdown.clone()));
    run_server(app, listener, shutdown).await
}

/// Cancel `shutdown` on Ctrl-C. Every open connection is closed with
/// `GoingAway`.
async fn shutdown_on_signal(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Shutdown signal received");
            shutdown.cancel();
        }
        Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
    }
}
