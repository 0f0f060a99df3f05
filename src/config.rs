use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use dotenvy::dotenv;
use thiserror::Error;
use validator::Validate;

use crate::storage::retry::RetryPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

#[derive(Debug, Clone, Validate)]
pub struct Config {
    /// Postgres connection string. Notes are kept in memory when absent.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub use_s3: bool,
    /// Full endpoint URL of the object store, e.g. `http://minio:9000`.
    pub storage_endpoint: String,
    pub storage_region: String,
    pub storage_access_key: String,
    pub storage_secret_key: String,
    #[validate(length(min = 3, max = 63))]
    pub storage_bucket: String,
    pub retry_enabled: bool,
    #[validate(range(max = 300))]
    pub retry_delay_secs: u64,
    pub retry_max_attempts: Option<u32>,
    pub upload_dir: PathBuf,
    #[validate(range(min = 1, max = 104857600))] // Max 100MB
    pub max_file_size: u64,
}

impl Config {
    /// Load configuration from environment variables (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = Config {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            bind_addr: parse("BIND_ADDR", var("BIND_ADDR", "0.0.0.0:3000"))?,
            use_s3: parse("USE_S3", var("USE_S3", "false"))?,
            storage_endpoint: storage_endpoint(&var("STORAGE_HOST", "localhost:9000")),
            storage_region: var("STORAGE_REGION", "us-east-1"),
            storage_access_key: var("STORAGE_ACCESS_KEY", "minioadmin"),
            storage_secret_key: var("STORAGE_SECRET_KEY", "minioadmin"),
            storage_bucket: var("STORAGE_BUCKET", "notes"),
            retry_enabled: parse("STORAGE_RETRY_ENABLED", var("STORAGE_RETRY_ENABLED", "true"))?,
            retry_delay_secs: parse(
                "STORAGE_RETRY_DELAY_SECS",
                var("STORAGE_RETRY_DELAY_SECS", "5"),
            )?,
            retry_max_attempts: lookup("STORAGE_RETRY_MAX_ATTEMPTS")
                .map(|value| parse("STORAGE_RETRY_MAX_ATTEMPTS", value))
                .transpose()?,
            upload_dir: PathBuf::from(var("UPLOAD_DIR", "uploads")),
            max_file_size: parse("MAX_FILE_SIZE", var("MAX_FILE_SIZE", "10485760"))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Retry policy for the startup bucket check.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            enabled: self.retry_enabled,
            delay: Duration::from_secs(self.retry_delay_secs),
            max_attempts: self.retry_max_attempts,
        }
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

/// A bare `host` or `host:port` becomes `http://host:9000` / `http://host:port`.
fn storage_endpoint(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        return host.to_string();
    }
    if host.contains(':') {
        format!("http://{}", host)
    } else {
        format!("http://{}:9000", host)
    }
}
