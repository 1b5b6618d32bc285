use common::postgres::PostgresConfig;
use config::{Config, ConfigError, Environment};
use garde::Validate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backing store for measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    /// Process-local map; contents are lost on restart
    Memory,
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    #[garde(length(min = 1))]
    pub log_level: String,

    // HTTP configuration
    #[serde(default = "default_http_host")]
    #[garde(length(min = 1))]
    pub http_host: String,

    #[serde(default = "default_http_port")]
    #[garde(range(min = 1))]
    pub http_port: u16,

    /// Upper bound for a whole request in seconds
    #[serde(default = "default_request_timeout_secs")]
    #[garde(range(min = 1))]
    pub request_timeout_secs: u64,

    /// Path prefixes excluded from request logging (comma-separated)
    #[serde(default = "default_http_ignored_paths")]
    #[garde(skip)]
    pub http_ignored_paths: String,

    // Store configuration
    #[serde(default = "default_store_backend")]
    #[garde(skip)]
    pub store_backend: StoreBackend,

    /// Upper bound for a single store call in milliseconds
    #[serde(default = "default_store_timeout_ms")]
    #[garde(range(min = 1))]
    pub store_timeout_ms: u64,

    // PostgreSQL configuration
    #[serde(default = "default_postgres_host")]
    #[garde(length(min = 1))]
    pub postgres_host: String,

    #[serde(default = "default_postgres_port")]
    #[garde(range(min = 1))]
    pub postgres_port: u16,

    #[serde(default = "default_postgres_database")]
    #[garde(length(min = 1))]
    pub postgres_database: String,

    #[serde(default = "default_postgres_username")]
    #[garde(length(min = 1))]
    pub postgres_username: String,

    #[serde(default = "default_postgres_password")]
    #[garde(skip)]
    pub postgres_password: String,

    #[serde(default = "default_postgres_max_pool_size")]
    #[garde(range(min = 1))]
    pub postgres_max_pool_size: usize,

    // OpenTelemetry configuration
    #[serde(default = "default_otel_enabled")]
    #[garde(skip)]
    pub otel_enabled: bool,

    /// OTLP gRPC endpoint
    #[serde(default = "default_otel_endpoint")]
    #[garde(length(min = 1))]
    pub otel_endpoint: String,

    #[serde(default = "default_otel_service_name")]
    #[garde(length(min = 1))]
    pub otel_service_name: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_http_ignored_paths() -> String {
    "/testavailability".to_string()
}

fn default_store_backend() -> StoreBackend {
    StoreBackend::Postgres
}

fn default_store_timeout_ms() -> u64 {
    5_000
}

fn default_postgres_host() -> String {
    PostgresConfig::default().host
}

fn default_postgres_port() -> u16 {
    PostgresConfig::default().port
}

fn default_postgres_database() -> String {
    PostgresConfig::default().database
}

fn default_postgres_username() -> String {
    PostgresConfig::default().username
}

fn default_postgres_password() -> String {
    PostgresConfig::default().password
}

fn default_postgres_max_pool_size() -> usize {
    PostgresConfig::default().max_pool_size
}

fn default_otel_enabled() -> bool {
    false
}

fn default_otel_endpoint() -> String {
    common::telemetry::DEFAULT_OTLP_ENDPOINT.to_string()
}

fn default_otel_service_name() -> String {
    "particle-monitor".to_string()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("PARTICLE_MONITOR"))
            .build()?
            .try_deserialize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn postgres(&self) -> PostgresConfig {
        PostgresConfig {
            host: self.postgres_host.clone(),
            port: self.postgres_port,
            database: self.postgres_database.clone(),
            username: self.postgres_username.clone(),
            password: self.postgres_password.clone(),
            max_pool_size: self.postgres_max_pool_size,
        }
    }
}
