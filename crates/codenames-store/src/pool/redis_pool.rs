//! Pooled connections for the RedisJSON state store.
//!
//! Every store call holds a session's write lock while it waits on Redis, so
//! acquiring a connection is bounded by [`ACQUIRE_TIMEOUT`].

use codenames_common::RedisConfig;
use deadpool_redis::{Config, Pool, Runtime};
use std::sync::Arc;
use std::time::Duration;

/// Longest a store call waits to obtain or open a connection
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Command whose presence proves the RedisJSON module is loaded
const JSON_PROBE_COMMAND: &str = "JSON.GET";

#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(String),

    #[error("Failed to get connection from pool: {0}")]
    GetConnection(#[from] deadpool_redis::PoolError),

    #[error("Redis command error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Redis server does not provide {JSON_PROBE_COMMAND}; load the RedisJSON module")]
    MissingJsonModule,
}

pub type RedisResult<T> = Result<T, RedisPoolError>;

#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("status", &self.pool.status())
            .finish()
    }
}

impl RedisPool {
    /// Build the pool. No connection is opened until the first call.
    pub fn from_config(config: &RedisConfig) -> RedisResult<Self> {
        let pool = Config::from_url(&config.url)
            .builder()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?
            .max_size(config.max_connections as usize)
            .wait_timeout(Some(ACQUIRE_TIMEOUT))
            .create_timeout(Some(ACQUIRE_TIMEOUT))
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?;

        tracing::info!(
            url = %redact(&config.url),
            max_connections = config.max_connections,
            "Redis pool created"
        );
        Ok(Self { pool })
    }

    pub async fn get(&self) -> RedisResult<deadpool_redis::Connection> {
        self.pool.get().await.map_err(RedisPoolError::GetConnection)
    }

    #[must_use]
    pub fn status(&self) -> deadpool_redis::Status {
        self.pool.status()
    }

    /// Check that Redis answers and can serve JSON documents
    pub async fn health_check(&self) -> RedisResult<()> {
        let mut conn = self.get().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;

        let info: Vec<redis::Value> = redis::cmd("COMMAND")
            .arg("INFO")
            .arg(JSON_PROBE_COMMAND)
            .query_async(&mut conn)
            .await?;
        if matches!(info.first(), None | Some(redis::Value::Nil)) {
            return Err(RedisPoolError::MissingJsonModule);
        }
        Ok(())
    }
}

pub type SharedRedisPool = Arc<RedisPool>;

/// Strip credentials from a Redis URL
fn redact(url: &str) -> &str {
    url.rsplit_once('@').map_or(url, |(_, host)| host)
}
