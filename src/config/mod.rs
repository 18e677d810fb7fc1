use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use serde::Serialize;
use thiserror::Error;

/// Secret used when `JWT_SECRET` is unset outside production.
const DEVELOPMENT_SECRET: &str = "default-secret-key";

/// Upper bound for `JWT_EXPIRATION`: ten years.
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("Unsupported JWT algorithm {0}: only HS256, HS384 and HS512 are accepted")]
    UnsupportedAlgorithm(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub migrations: MigrationConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub enable_cors: bool,
}

/// Token signing settings, resolved once per process.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub expiration_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("expiration_secs", &self.expiration_secs)
            .finish()
    }
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, algorithm: Algorithm, expiration_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            algorithm,
            expiration_secs,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserStoreBackend {
    Memory,
    File(PathBuf),
    Database,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub users: UserStoreBackend,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerBackend {
    Database,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub ledger: LedgerBackend,
    pub directory: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };

        config.with_overrides(&lookup)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("AXION_API_PORT").or_else(|| lookup("PORT")) {
            self.server.port = parse_value("AXION_API_PORT", &v)?;
        }
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.server.enable_cors = v.parse().unwrap_or(self.server.enable_cors);
        }

        // JWT overrides
        match lookup("JWT_SECRET") {
            Some(secret) if !secret.is_empty() => self.jwt.secret = secret,
            _ if self.environment == Environment::Production => {
                return Err(ConfigError::Missing("JWT_SECRET"));
            }
            _ => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
            }
        }
        if let Some(v) = lookup("JWT_ALGORITHM") {
            self.jwt.algorithm = parse_algorithm(&v)?;
        }
        if let Some(v) = lookup("JWT_EXPIRATION") {
            let secs: u64 = parse_value("JWT_EXPIRATION", &v)?;
            if secs == 0 || secs > MAX_TOKEN_LIFETIME_SECS {
                return Err(ConfigError::Invalid { key: "JWT_EXPIRATION", value: v });
            }
            self.jwt.expiration_secs = secs;
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Storage overrides
        if let Some(v) = lookup("USER_STORE") {
            self.storage.users = match v.as_str() {
                "memory" => UserStoreBackend::Memory,
                "file" => UserStoreBackend::File(
                    lookup("USER_STORE_PATH").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("users.json")),
                ),
                "database" | "postgres" => UserStoreBackend::Database,
                _ => return Err(ConfigError::Invalid { key: "USER_STORE", value: v }),
            };
        }

        // Migration overrides
        if let Some(v) = lookup("MIGRATION_LEDGER") {
            self.migrations.ledger = match v.as_str() {
                "database" | "postgres" => LedgerBackend::Database,
                "file" => LedgerBackend::File(
                    lookup("MIGRATION_LEDGER_PATH")
                        .map(PathBuf::from)
                        .unwrap_or_else(|| PathBuf::from("migrations.json")),
                ),
                _ => return Err(ConfigError::Invalid { key: "MIGRATION_LEDGER", value: v }),
            };
        }
        if let Some(v) = lookup("MIGRATIONS_DIR") {
            self.migrations.directory = PathBuf::from(v);
        }

        Ok(self)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000, enable_cors: true },
            jwt: JwtConfig::new(DEVELOPMENT_SECRET, Algorithm::HS256, 3600),
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            storage: StorageConfig { users: UserStoreBackend::Memory },
            migrations: MigrationConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 3000, enable_cors: true },
            jwt: JwtConfig::new(DEVELOPMENT_SECRET, Algorithm::HS256, 3600),
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            storage: StorageConfig { users: UserStoreBackend::Database },
            migrations: MigrationConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 3000, enable_cors: false },
            jwt: JwtConfig::new(String::new(), Algorithm::HS256, 3600),
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            storage: StorageConfig { users: UserStoreBackend::Database },
            migrations: MigrationConfig::default(),
        }
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerBackend::Database,
            directory: PathBuf::from("src/database/migrations"),
        }
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

fn parse_algorithm(value: &str) -> Result<Algorithm, ConfigError> {
    let algorithm = Algorithm::from_str(value.trim())
        .map_err(|_| ConfigError::UnsupportedAlgorithm(value.to_string()))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        _ => Err(ConfigError::UnsupportedAlgorithm(value.to_string())),
    }
}
