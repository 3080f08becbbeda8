/**
 * Server Configuration
 *
 * This module assembles the server configuration and opens the database.
 *
 * # Configuration Sources
 *
 * Later sources override earlier ones:
 *
 * 1. Built-in defaults suitable for local development
 * 2. An optional TOML file named by `CHAT_CONFIG_FILE`
 * 3. Environment variables (`SERVER_PORT`, `DATABASE_URL`, `JWT_SECRET`, ...)
 *
 * # Example File
 *
 * ```toml
 * port = 5012
 * database_url = "sqlite://chat.db"
 * jwt_secret = "change-me"
 * session_buffer = 128
 * ```
 */

use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Secret used when `JWT_SECRET` is not configured
const DEVELOPMENT_JWT_SECRET: &str = "securechat-development-secret";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Token issuing settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for JWT signing
    pub jwt_secret: String,
    /// Lifetime of access tokens
    pub access_token_ttl: Duration,
    /// Lifetime of refresh tokens
    pub refresh_token_ttl: Duration,
}

/// Socket session settings
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Capacity of each session's outbox
    pub session_buffer: usize,
    /// Upper bound on a single socket write
    pub send_timeout: Duration,
}

/// Page size bounds for message listing
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    pub realtime: RealtimeConfig,
    pub pagination: PaginationConfig,
}

/// On-disk form; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    database_url: Option<String>,
    jwt_secret: Option<String>,
    access_token_ttl_days: Option<u64>,
    refresh_token_ttl_days: Option<u64>,
    session_buffer: Option<usize>,
    socket_send_timeout_ms: Option<u64>,
    default_page_size: Option<u32>,
    max_page_size: Option<u32>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5012,
            database_url: "sqlite://securechat.db".to_string(),
            auth: AuthConfig {
                jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
                access_token_ttl: days(30),
                refresh_token_ttl: days(90),
            },
            realtime: RealtimeConfig {
                session_buffer: 64,
                send_timeout: Duration::from_secs(5),
            },
            pagination: PaginationConfig {
                default_page_size: 10,
                max_page_size: 100,
            },
        }
    }
}

fn days(n: u64) -> Duration {
    Duration::from_secs(n * 24 * 60 * 60)
}

impl ServerConfig {
    /// Load configuration from `CHAT_CONFIG_FILE` (if set) and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let file = match std::env::var("CHAT_CONFIG_FILE") {
            Ok(path) => Some(std::fs::read_to_string(&path).map_err(|source| {
                ConfigError::ReadFile { path, source }
            })?),
            Err(_) => None,
        };
        Self::from_sources(file.as_deref(), |key| std::env::var(key).ok())
    }

    /// Build configuration from optional TOML text and an environment lookup
    pub fn from_sources<F>(file: Option<&str>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(text) = file {
            let file: FileConfig = toml::from_str(text)?;
            config.apply_file(file);
        }

        if let Some(host) = env("SERVER_HOST") {
            config.host = host;
        }
        if let Some(port) = parse_env(&env, "SERVER_PORT")? {
            config.port = port;
        }
        if let Some(url) = env("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(secret) = env("JWT_SECRET") {
            config.auth.jwt_secret = secret;
        }
        if let Some(n) = parse_env(&env, "ACCESS_TOKEN_TTL_DAYS")? {
            config.auth.access_token_ttl = days(n);
        }
        if let Some(n) = parse_env(&env, "REFRESH_TOKEN_TTL_DAYS")? {
            config.auth.refresh_token_ttl = days(n);
        }
        if let Some(n) = parse_env(&env, "SESSION_BUFFER")? {
            config.realtime.session_buffer = n;
        }
        if let Some(ms) = parse_env(&env, "SOCKET_SEND_TIMEOUT_MS")? {
            config.realtime.send_timeout = Duration::from_millis(ms);
        }
        if let Some(n) = parse_env(&env, "DEFAULT_PAGE_SIZE")? {
            config.pagination.default_page_size = n;
        }
        if let Some(n) = parse_env(&env, "MAX_PAGE_SIZE")? {
            config.pagination.max_page_size = n;
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(url) = file.database_url {
            self.database_url = url;
        }
        if let Some(secret) = file.jwt_secret {
            self.auth.jwt_secret = secret;
        }
        if let Some(n) = file.access_token_ttl_days {
            self.auth.access_token_ttl = days(n);
        }
        if let Some(n) = file.refresh_token_ttl_days {
            self.auth.refresh_token_ttl = days(n);
        }
        if let Some(n) = file.session_buffer {
            self.realtime.session_buffer = n;
        }
        if let Some(ms) = file.socket_send_timeout_ms {
            self.realtime.send_timeout = Duration::from_millis(ms);
        }
        if let Some(n) = file.default_page_size {
            self.pagination.default_page_size = n;
        }
        if let Some(n) = file.max_page_size {
            self.pagination.max_page_size = n;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.realtime.session_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                key: "session_buffer",
                value: "0".to_string(),
            });
        }
        let pages = &self.pagination;
        if pages.default_page_size == 0 || pages.default_page_size > pages.max_page_size {
            return Err(ConfigError::InvalidValue {
                key: "default_page_size",
                value: pages.default_page_size.to_string(),
            });
        }
        if self.auth.jwt_secret == DEVELOPMENT_JWT_SECRET {
            tracing::warn!("[Server] JWT_SECRET not set, using the development secret");
        }
        Ok(())
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<F, T>(env: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match env(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(None),
    }
}

/// Open the SQLite pool and run migrations
///
/// This function:
/// 1. Parses `database_url` and creates the database file if missing
/// 2. Creates a connection pool
/// 3. Runs the embedded migrations
///
/// # Errors
///
/// Unlike optional services, the database is required: any failure is
/// returned and aborts startup.
pub async fn load_database(config: &ServerConfig) -> Result<SqlitePool, ConfigError> {
    tracing::info!("[Server] Connecting to database...");

    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;

    tracing::info!("[Server] Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("[Server] Database ready");

    Ok(pool)
}
