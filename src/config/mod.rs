pub mod app_conf;
pub mod document_conf;
pub mod minio_conf;
pub mod mongo_conf;

pub use app_conf::AppConfig;
pub use document_conf::DocumentConfig;
pub use minio_conf::MinioConfig;
pub use mongo_conf::MongoConfig;

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Read an optional variable and parse it, falling back to `default` when unset.
pub(crate) fn env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| {
            tracing::error!("Invalid {} value: {}", key, raw);
            ConfigError::InvalidValue(format!("Invalid {} value: {}", key, raw))
        }),
        Err(_) => {
            tracing::debug!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}
