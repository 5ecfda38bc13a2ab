//! # Configuration Management
//!
//! This module handles loading configuration from environment variables.
//! It uses the "12-factor app" methodology where configuration comes from the environment.
//!
//! ## Environment Variables
//! - `SESSION_SECRET`: Cookie signing secret, at least 64 bytes (required)
//! - `DATABASE_URL`: SQLite connection string, e.g. `sqlite:notes.db?mode=rwc` (required)
//! - `HOST`: Server bind address (default: 127.0.0.1)
//! - `PORT`: Server port (default: 5000)
//! - `CORS_ALLOWED_ORIGINS`: Comma-separated allow-list override
//! - `COOKIE_SECURE`: `true`/`false`, mark the session cookie Secure
//!   (default: true in release builds, false in debug builds)
//!
//! The process refuses to start when a required variable is missing or invalid.

use crate::middleware::cors::DEFAULT_ALLOWED_ORIGINS;
use std::env;
use std::fmt;

/// Shortest accepted session secret, the minimum for a cookie signing key
pub const MIN_SESSION_SECRET_LEN: usize = 64;

/// Application configuration
///
/// All fields are public for easy access from other modules. The allow-list
/// and every other value are read-only once the server starts.
#[derive(Clone)]
pub struct Config {
    /// Server host/IP address to bind to
    /// Examples: "127.0.0.1" (localhost only), "0.0.0.0" (all interfaces)
    pub host: String,

    /// Server port number
    pub port: u16,

    /// SQLite database connection URL, shared by notes, users and sessions
    /// Format: "sqlite:filename.db?mode=rwc"
    pub database_url: String,

    /// Secret the session cookie signing key is derived from
    pub session_secret: String,

    /// Origins allowed to make credentialed cross-origin requests
    pub allowed_origins: Vec<String>,

    /// Whether the session cookie carries the Secure attribute
    pub cookie_secure: bool,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid environment variable value
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` first (if present) using dotenvy, then validates.
    ///
    /// ## Example .env file
    /// ```text
    /// SESSION_SECRET=<64 or more random characters>
    /// DATABASE_URL=sqlite:notes.db?mode=rwc
    /// PORT=5000
    /// ```
    pub fn from_env() -> Result<Self, ConfigError> {
        // dotenvy doesn't error if the file is missing
        dotenvy::dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build and validate configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
        };

        let session_secret = required("SESSION_SECRET")?;
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::InvalidValue {
                name: "SESSION_SECRET".to_string(),
                reason: format!(
                    "must be at least {} bytes, got {}",
                    MIN_SESSION_SECRET_LEN,
                    session_secret.len()
                ),
            });
        }

        let database_url = required("DATABASE_URL")?;
        if !database_url.starts_with("sqlite:") {
            return Err(ConfigError::InvalidValue {
                name: "DATABASE_URL".to_string(),
                reason: "must be a sqlite: connection string".to_string(),
            });
        }

        let port = match lookup("PORT") {
            Some(port) => port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT".to_string(),
                reason: format!("{:?} is not a valid port number", port),
            })?,
            None => 5000,
        };

        let allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(origins) => origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let cookie_secure = match lookup("COOKIE_SECURE") {
            Some(value) => parse_bool("COOKIE_SECURE", &value)?,
            // Plain-HTTP localhost development needs non-Secure cookies
            None => !cfg!(debug_assertions),
        };

        Ok(Config {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            database_url,
            session_secret,
            allowed_origins,
            cookie_secure,
        })
    }

    /// Get the socket address to bind the server to
    ///
    /// Example: "127.0.0.1:5000"
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Secrets stay out of the logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("session_secret", &"<redacted>")
            .field("allowed_origins", &self.allowed_origins)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("{:?} is not a boolean", other),
        }),
    }
}
