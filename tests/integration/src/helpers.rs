//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers and making HTTP requests.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use codenames_common::{AppConfig, Identity, JwtService};
use codenames_core::{MemberId, SessionId};
use codenames_gateway::server::CreateGameResponse;
use codenames_gateway::{create_app, create_gateway_state, run_server, GatewayState};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::client::WsClient;

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: GatewayState,
    jwt: JwtService,
    shutdown: CancellationToken,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        Self::start_with(&[]).await
    }

    /// Start a test server with extra configuration variables
    pub async fn start_with(vars: &[(&str, &str)]) -> Result<Self> {
        let config = test_config(vars)?;
        let jwt = JwtService::new(&config.jwt.secret, config.jwt.token_expiry);

        let state = create_gateway_state(config).await?;
        let shutdown = state.shutdown_token().clone();
        let app = create_app(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn({
            let shutdown = shutdown.clone();
            async move {
                run_server(app, listener, shutdown).await.ok();
            }
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            state,
            jwt,
            shutdown,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Issue an identity token the server accepts
    pub fn token(&self, identity: &Identity) -> String {
        self.jwt.issue(identity).unwrap_or_default()
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a POST request with auth token
    pub async fn post_auth(&self, path: &str, token: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).bearer_auth(token).send().await?)
    }

    /// Create a game hosted by `host` and return its id
    pub async fn create_game(&self, host: &Identity) -> Result<SessionId> {
        let response = self.post_auth("/games", &self.token(host)).await?;
        let created: CreateGameResponse = assert_json(response, StatusCode::CREATED).await?;
        Ok(created.game_id)
    }

    /// Open a gateway connection as `identity`
    pub async fn connect(&self, identity: &Identity) -> Result<WsClient> {
        let url = format!("ws://{}/gateway?token={}", self.addr, self.token(identity));
        WsClient::connect(&url).await
    }

    /// Poll `/health` until `check` accepts it
    pub async fn wait_for_health(&self, check: impl Fn(&serde_json::Value) -> bool) -> Result<()> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        loop {
            let body: serde_json::Value = assert_json(self.get("/health").await?, StatusCode::OK).await?;
            if check(&body) {
                return Ok(());
            }
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("Health never matched, last: {body}");
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// A fresh member identity
pub fn member(name: &str) -> Identity {
    Identity::new(MemberId::new(), name)
}

/// Create a test configuration over the in-memory store
pub fn test_config(vars: &[(&str, &str)]) -> Result<AppConfig> {
    let defaults = [
        ("GATEWAY_HOST", "127.0.0.1"),
        ("GATEWAY_PORT", "0"),
        ("STATE_STORE", "memory"),
        ("JWT_SECRET", "integration-test-secret"),
    ];
    let config = AppConfig::from_lookup(|key| {
        vars.iter()
            .chain(defaults.iter())
            .find(|(k, _)| *k == key)
            .map(|(_, v)| (*v).to_string())
    })
    .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    Ok(config)
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(())
}
