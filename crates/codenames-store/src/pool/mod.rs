//! Redis connection pool module.
//!
//! Connection pooling for the RedisJSON state store using deadpool-redis.

mod redis_pool;

pub use redis_pool::{RedisPool, RedisPoolError, RedisResult, SharedRedisPool, ACQUIRE_TIMEOUT};
