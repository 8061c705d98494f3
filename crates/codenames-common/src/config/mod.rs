//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, Environment, GameConfig, JwtConfig, LivenessConfig,
    RedisConfig, ServerConfig, StoreBackend, StoreConfig,
};
