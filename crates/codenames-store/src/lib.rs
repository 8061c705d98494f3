//! # codenames-store
//!
//! State store layer for per-session game-state documents.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **State Store**: Path-addressed document access, backed by RedisJSON or memory
//! - **Rosters**: Idempotent roster synchronization over the document
//!
//! ## Example
//!
//! ```ignore
//! use codenames_store::{GameStateRepository, RedisPool, RedisStateStore};
//!
//! let pool = Arc::new(RedisPool::from_config(&config.store.redis)?);
//! pool.health_check().await?;
//! let store = Arc::new(RedisStateStore::new(pool));
//! let games = GameStateRepository::new(store);
//!
//! games.create(session_id, &initial_state).await?;
//! games.add_to_roster(session_id, Roster::Spectators, &player).await?;
//! ```

pub mod pool;
pub mod roster;
pub mod state;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolError, RedisResult, SharedRedisPool, ACQUIRE_TIMEOUT};

// Re-export state store types
pub use state::{MemoryStateStore, RedisStateStore, StateStore, StoreError, StoreResult};

// Re-export roster types
pub use roster::{GameStateRepository, RosterOutcome};
