//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use codenames_core::{BoardSize, GameSettings, DEFAULT_ASSASSIN_COUNT, DEFAULT_MAX_WORDS_PER_TEAM};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub gateway: ServerConfig,
    pub store: StoreConfig,
    pub jwt: JwtConfig,
    pub liveness: LivenessConfig,
    pub game: GameConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which state store backs the game-state documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redis,
    Memory,
}

/// State store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Required when `backend` is `Redis`
    pub redis: Option<RedisConfig>,
    /// Expiry applied to a document when it is written
    pub game_state_ttl_seconds: Option<u64>,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_token_expiry")]
    pub token_expiry: i64,
}

/// Connection liveness probing
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LivenessConfig {
    #[serde(default = "default_liveness_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_liveness_timeout")]
    pub timeout_secs: u64,
}

impl LivenessConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_liveness_interval(),
            timeout_secs: default_liveness_timeout(),
        }
    }
}

/// New-game board parameters
#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_board_side")]
    pub board_width: usize,
    #[serde(default = "default_board_side")]
    pub board_height: usize,
    #[serde(default = "default_max_words_per_team")]
    pub max_words_per_team: usize,
    #[serde(default = "default_assassin_count")]
    pub assassin_count: usize,
    /// JSON wordpack to draw boards from; the bundled pack is used when unset
    pub wordpack_path: Option<String>,
}

impl GameConfig {
    #[must_use]
    pub fn settings(&self) -> GameSettings {
        GameSettings {
            board_size: BoardSize::new(self.board_width, self.board_height),
            max_words_per_team: self.max_words_per_team,
            assassin_count: self.assassin_count,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: default_board_side(),
            board_height: default_board_side(),
            max_words_per_team: default_max_words_per_team(),
            assassin_count: default_assassin_count(),
            wordpack_path: None,
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "codenames-gateway".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_token_expiry() -> i64 {
    604_800 // 7 days
}

fn default_liveness_interval() -> u64 {
    30
}

fn default_liveness_timeout() -> u64 {
    10
}

fn default_board_side() -> usize {
    5
}

fn default_max_words_per_team() -> usize {
    DEFAULT_MAX_WORDS_PER_TEAM
}

fn default_assassin_count() -> usize {
    DEFAULT_ASSASSIN_COUNT
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &'static str| -> Result<Option<u64>, ConfigError> {
            lookup(key)
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .map_err(|_| ConfigError::InvalidValue(key, raw))
                })
                .transpose()
        };
        let positive = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            match parsed(key)? {
                Some(0) => Err(ConfigError::InvalidValue(key, "0".to_string())),
                value => Ok(value.unwrap_or(default)),
            }
        };
        let parsed_usize = |key: &'static str, default: usize| -> Result<usize, ConfigError> {
            Ok(parsed(key)?.map_or(default, |v| v as usize))
        };

        let backend = match lookup("STATE_STORE").as_deref().map(str::to_lowercase) {
            None => StoreBackend::default(),
            Some(s) if s == "redis" => StoreBackend::Redis,
            Some(s) if s == "memory" => StoreBackend::Memory,
            Some(s) => return Err(ConfigError::InvalidValue("STATE_STORE", s)),
        };

        let redis = match lookup("REDIS_URL") {
            Some(url) => Some(RedisConfig {
                url,
                max_connections: parsed("REDIS_MAX_CONNECTIONS")?
                    .map_or_else(default_redis_max_connections, |v| v as u32),
            }),
            None if backend == StoreBackend::Redis => {
                return Err(ConfigError::MissingVar("REDIS_URL"));
            }
            None => None,
        };

        let port = lookup("GATEWAY_PORT").ok_or(ConfigError::MissingVar("GATEWAY_PORT"))?;

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            gateway: ServerConfig {
                host: lookup("GATEWAY_HOST").unwrap_or_else(default_host),
                port: port
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("GATEWAY_PORT", port.clone()))?,
            },
            store: StoreConfig {
                backend,
                redis,
                game_state_ttl_seconds: parsed("GAME_STATE_TTL_SECONDS")?,
            },
            jwt: JwtConfig {
                secret: lookup("JWT_SECRET").ok_or(ConfigError::MissingVar("JWT_SECRET"))?,
                token_expiry: parsed("JWT_TOKEN_EXPIRY")?
                    .map_or_else(default_token_expiry, |v| v as i64),
            },
            liveness: LivenessConfig {
                interval_secs: positive("LIVENESS_INTERVAL_SECS", default_liveness_interval())?,
                timeout_secs: positive("LIVENESS_TIMEOUT_SECS", default_liveness_timeout())?,
            },
            game: GameConfig {
                board_width: parsed_usize("BOARD_WIDTH", default_board_side())?,
                board_height: parsed_usize("BOARD_HEIGHT", default_board_side())?,
                max_words_per_team: parsed_usize(
                    "MAX_WORDS_PER_TEAM",
                    default_max_words_per_team(),
                )?,
                assassin_count: parsed_usize("ASSASSIN_COUNT", default_assassin_count())?,
                wordpack_path: lookup("WORDPACK_PATH"),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
