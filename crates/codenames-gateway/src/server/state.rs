//! Gateway state
//!
//! Application state for the gateway server.

use crate::auth::IdentityVerifier;
use crate::liveness::LivenessMonitor;
use crate::session::SessionRegistry;
use codenames_common::AppConfig;
use codenames_core::Wordpack;
use codenames_store::GameStateRepository;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server.
#[derive(Clone)]
pub struct GatewayState {
    registry: Arc<SessionRegistry>,
    verifier: Arc<dyn IdentityVerifier>,
    wordpack: Arc<Wordpack>,
    config: Arc<AppConfig>,
    liveness: LivenessMonitor,
    /// Parent of every connection's cancellation token
    shutdown: CancellationToken,
}

impl GatewayState {
    pub fn new(
        games: GameStateRepository,
        verifier: Arc<dyn IdentityVerifier>,
        wordpack: Wordpack,
        config: AppConfig,
    ) -> Self {
        Self {
            registry: SessionRegistry::new(games),
            verifier,
            wordpack: Arc::new(wordpack),
            liveness: LivenessMonitor::from(&config.liveness),
            config: Arc::new(config),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn games(&self) -> &GameStateRepository {
        self.registry.games()
    }

    pub fn verifier(&self) -> &dyn IdentityVerifier {
        self.verifier.as_ref()
    }

    /// Word pool new boards are drawn from
    pub fn wordpack(&self) -> &Wordpack {
        &self.wordpack
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn liveness(&self) -> LivenessMonitor {
        self.liveness
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("registry", &self.registry)
            .field("liveness", &self.liveness)
            .field("config", &"AppConfig")
            .finish_non_exhaustive()
    }
}
