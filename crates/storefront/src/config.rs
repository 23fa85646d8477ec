//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (postgres storage)
//! - `PAWCASE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `PAWCASE_STORAGE` - `postgres` (default) or `memory`
//! - `PAWCASE_HOST` - Bind address (default: 127.0.0.1)
//! - `PAWCASE_PORT` - Listen port (default: 5000)
//! - `PAWCASE_BASE_URL` - Public URL of the API (default: `http://localhost:5000`)
//! - `PAWCASE_ALLOWED_ORIGIN` - Origin of the storefront frontend, enables CORS
//! - `PAWCASE_MAX_BODY_BYTES` - Request body limit in bytes (default: 10 MiB)
//! - `PAWCASE_LOG_FORMAT` - `pretty` (default) or `json`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry performance sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default request body limit (10 MiB).
///
/// Order and catalog payloads embed base64 images, so this is the limit
/// that the `probe` CLI command measures.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which storage backend the storefront uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// `PostgreSQL` for data and sessions.
    #[default]
    Postgres,
    /// Process-local memory. Everything is lost on restart.
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected `postgres` or `memory`, got `{other}`")),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `pretty` or `json`, got `{other}`")),
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Storage backend for data and sessions
    pub storage: StorageBackend,
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the API (no trailing slash)
    pub base_url: String,
    /// Frontend origin allowed to make credentialed CORS requests
    pub allowed_origin: Option<String>,
    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry performance trace sample rate
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let storage: StorageBackend = parse_env_or_default("PAWCASE_STORAGE", "postgres")?;
        let database_url = match storage {
            StorageBackend::Postgres => Some(get_database_url("PAWCASE_DATABASE_URL")?),
            StorageBackend::Memory => None,
        };
        let host: IpAddr = parse_env_or_default("PAWCASE_HOST", "127.0.0.1")?;
        let port: u16 = parse_env_or_default("PAWCASE_PORT", "5000")?;
        let base_url: Url = parse_env_or_default("PAWCASE_BASE_URL", "http://localhost:5000")?;
        let base_url = base_url.as_str().trim_end_matches('/').to_owned();
        let max_body_bytes: usize =
            parse_env_or_default("PAWCASE_MAX_BODY_BYTES", &DEFAULT_MAX_BODY_BYTES.to_string())?;
        let log_format: LogFormat = parse_env_or_default("PAWCASE_LOG_FORMAT", "pretty")?;
        let sentry_traces_sample_rate: f32 =
            parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")?;

        Ok(Self {
            storage,
            database_url,
            host,
            port,
            base_url,
            allowed_origin: get_optional_env("PAWCASE_ALLOWED_ORIGIN"),
            max_body_bytes,
            log_format,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_traces_sample_rate,
        })
    }

    /// Configuration for in-process use (tests, local tooling): memory storage
    /// on a loopback address with default limits.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            storage: StorageBackend::Memory,
            database_url: None,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 5000,
            base_url: "http://localhost:5000".to_owned(),
            allowed_origin: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log_format: LogFormat::Pretty,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    parse_value(key, &raw)
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
