//! Codenames Gateway Server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p codenames-gateway
//! ```
//!
//! Configuration is loaded from environment variables.

use codenames_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Gateway failed to start");
        eprintln!("Gateway failed to start: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        address = %config.gateway.address(),
        store = ?config.store.backend,
        "Configuration loaded"
    );

    codenames_gateway::run(config).await?;

    Ok(())
}
