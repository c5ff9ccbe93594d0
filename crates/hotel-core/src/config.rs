//! Configuration Management
//!
//! Handles configuration from environment variables and TOML files with
//! sensible defaults for development. The token signing secret has no
//! default: a configuration without one fails [`AppConfig::validate`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Database connection
    pub database: DatabaseConfig,

    /// Token signing
    pub auth: AuthConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_override()
    }

    /// Load from the TOML file named by `HOTEL_CONFIG` when set, otherwise
    /// from defaults. Environment variables override either source.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(std::env::var_os("HOTEL_CONFIG").map(PathBuf::from))
    }

    fn load_from(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path)?.with_env_override(),
            None => Self::from_env(),
        }
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        if let Ok(host) = std::env::var("API_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("API_PORT") {
            self.server.port = parse_var("API_PORT", port)?;
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = Some(url).filter(|u| !u.trim().is_empty());
        }
        if let Ok(size) = std::env::var("DATABASE_POOL_SIZE") {
            self.database.pool_size = parse_var("DATABASE_POOL_SIZE", size)?;
        }

        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Ok(email) = std::env::var("ADMIN_EMAIL") {
            self.auth.admin_email = Some(email).filter(|e| !e.trim().is_empty());
        }
        if let Ok(password) = std::env::var("ADMIN_PASSWORD") {
            self.auth.admin_password = Some(password).filter(|p| !p.is_empty());
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.logging.json_format = format.eq_ignore_ascii_case("json");
        }

        Ok(self)
    }

    /// Check values that have no usable default
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }
        match (&self.auth.admin_email, &self.auth.admin_password) {
            (Some(_), None) => {
                return Err(ConfigError::MissingRequired("ADMIN_PASSWORD".to_string()))
            }
            (None, Some(_)) => return Err(ConfigError::MissingRequired("ADMIN_EMAIL".to_string())),
            _ => {}
        }
        if self.database.pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DATABASE_POOL_SIZE".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL; in-memory stores are used when unset
    pub url: Option<String>,

    /// Connection pool size
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: 5,
        }
    }
}

/// Token signing and bootstrap administrator configuration
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for signing bearer tokens
    #[serde(skip_serializing)]
    pub jwt_secret: String,

    /// Email of the administrator ensured at startup
    pub admin_email: Option<String>,

    #[serde(skip_serializing)]
    pub admin_password: Option<String>,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            ..Self::default()
        }
    }

    /// Credentials of the startup administrator, when both are configured
    pub fn bootstrap_admin(&self) -> Option<(&str, &str)> {
        match (&self.admin_email, &self.admin_password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("admin_email", &self.admin_email)
            .field(
                "admin_password",
                &self.admin_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
