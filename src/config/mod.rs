use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// bcrypt work factor used by every preset
pub const BCRYPT_COST: u32 = 10;

/// Range bcrypt accepts for its work factor
pub const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Longest token lifetime accepted (ten years)
pub const MAX_JWT_EXPIRY_HOURS: u64 = 10 * 365 * 24;

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("SECRET_KEY must be set to sign session tokens")]
    MissingSecret,

    #[error("{name} has an invalid value '{value}'")]
    InvalidSetting { name: &'static str, value: String },

    #[error("SECURITY_BCRYPT_COST must be between 4 and 31, got {0}")]
    BcryptCostOutOfRange(u32),

    #[error("SECURITY_JWT_EXPIRY_HOURS must be between 1 and {max}, got {0}", max = MAX_JWT_EXPIRY_HOURS)]
    JwtExpiryOutOfRange(u64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string. `None` selects the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub uploads_dir: PathBuf,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    /// Token lifetime. `None` issues tokens without an `exp` claim.
    pub jwt_expiry_hours: Option<u64>,
    pub bcrypt_cost: u32,
    /// Allowed cross-origin hosts. Empty means permissive CORS.
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from a variable lookup; `from_env` passes the process
    /// environment
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = match var("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&var)?;

        config.validate()?;
        Ok(config)
    }

    fn with_overrides(mut self, var: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Server overrides
        if let Some(v) = var("BLOG_API_HOST") {
            self.server.host = v;
        }
        if let Some(port) = var("BLOG_API_PORT")
            .or_else(|| var("PORT"))
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Some(v) = var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Some(v) = var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Some(v) = var("API_UPLOADS_DIR") {
            self.api.uploads_dir = PathBuf::from(v);
        }
        if let Some(v) = var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides are strict: a typo must not silently weaken auth
        if let Some(v) = var("SECRET_KEY") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = var("SECURITY_JWT_EXPIRY_HOURS") {
            let v = v.trim();
            self.security.jwt_expiry_hours = if v.is_empty() {
                None
            } else {
                Some(parse_setting("SECURITY_JWT_EXPIRY_HOURS", v)?)
            };
        }
        if let Some(v) = var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = parse_setting("SECURITY_BCRYPT_COST", v.trim())?;
        }
        if let Some(v) = var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(self)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let security = &self.security;

        if security.jwt_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if !BCRYPT_COST_RANGE.contains(&security.bcrypt_cost) {
            return Err(ConfigError::BcryptCostOutOfRange(security.bcrypt_cost));
        }
        if let Some(hours) = security.jwt_expiry_hours {
            if hours == 0 || hours > MAX_JWT_EXPIRY_HOURS {
                return Err(ConfigError::JwtExpiryOutOfRange(hours));
            }
        }

        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                uploads_dir: PathBuf::from("uploads"),
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: "development-secret-change-me".to_string(),
                jwt_expiry_hours: None,
                bcrypt_cost: BCRYPT_COST,
                cors_origins: vec![],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                uploads_dir: PathBuf::from("uploads"),
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: None,
                bcrypt_cost: BCRYPT_COST,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                uploads_dir: PathBuf::from("uploads"),
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: None,
                bcrypt_cost: BCRYPT_COST,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }

    /// Address the HTTP listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_setting<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidSetting {
        name,
        value: value.to_string(),
    })
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<Result<AppConfig, ConfigError>> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> Result<&'static AppConfig, ConfigError> {
    CONFIG.as_ref().map_err(Clone::clone)
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!(
            $crate::config::CONFIG.as_ref().map(|c| c.environment),
            Ok($crate::config::Environment::Production)
        )
    };
}
