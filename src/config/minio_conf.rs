use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::{env_or, ConfigError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinioConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket_name: String,
    /// Public base URL that stored objects are served from.
    pub links_prefix: String,
    pub region: Option<String>,
    pub secure: bool,
}

impl MinioConfig {
    /// `Ok(None)` when `MINIO_ENDPOINT` is unset: image storage is then
    /// disabled and uploads fail with a configuration error. Otherwise
    /// `MINIO_ACCESS_KEY`, `MINIO_SECRET_KEY` and `MINIO_BUCKET_NAME` are
    /// required; `MINIO_REGION`, `MINIO_SECURE` and `MINIO_LINKS_PREFIX`
    /// (public base URL of stored images) are optional.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        info!("Loading MinIO configuration from environment variables");

        let endpoint = match env::var("MINIO_ENDPOINT") {
            Ok(endpoint) if !endpoint.trim().is_empty() => endpoint,
            _ => {
                warn!("MINIO_ENDPOINT not set, image storage is disabled");
                return Ok(None);
            }
        };
        debug!("MinIO endpoint: {}", endpoint);

        let required = |key: &str| {
            env::var(key).map_err(|_| {
                error!("{} is required once MINIO_ENDPOINT is set", key);
                ConfigError::EnvVarNotFound(format!("{} (required together with MINIO_ENDPOINT)", key))
            })
        };
        let access_key = required("MINIO_ACCESS_KEY")?;
        let secret_key = required("MINIO_SECRET_KEY")?;
        let bucket_name = required("MINIO_BUCKET_NAME")?;
        debug!("MinIO bucket name: {}", bucket_name);

        let region = Some(env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string()));
        let secure = env_or("MINIO_SECURE", false)?;

        let links_prefix = env::var("MINIO_LINKS_PREFIX").unwrap_or_else(|_| {
            let scheme = if secure { "https" } else { "http" };
            let fallback = format!("{}://{}", scheme, endpoint);
            warn!("MINIO_LINKS_PREFIX not set, using {}", fallback);
            fallback
        });

        let config = Self {
            endpoint,
            access_key,
            secret_key,
            bucket_name,
            links_prefix,
            region,
            secure,
        };
        config.validate()?;

        info!("MinIO configuration loaded successfully");
        Ok(Some(config))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let problem = if self.endpoint.contains("://") {
            Some("MINIO_ENDPOINT is host:port without a scheme; use MINIO_SECURE for https")
        } else if self.access_key.is_empty() || self.secret_key.is_empty() {
            Some("MinIO credentials cannot be empty")
        } else if !(3..=63).contains(&self.bucket_name.len()) {
            Some("MINIO_BUCKET_NAME must be between 3 and 63 characters")
        } else if !self
            .bucket_name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
        {
            Some("MINIO_BUCKET_NAME may only contain lowercase letters, digits, '-' and '.'")
        } else {
            None
        };
        match problem {
            Some(message) => {
                error!(bucket = %self.bucket_name, "{}", message);
                Err(ConfigError::ValidationError(message.to_string()))
            }
            None => Ok(()),
        }
    }

    /// `http(s)://endpoint`, as the client expects it.
    pub fn endpoint_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}", scheme, self.endpoint)
    }

    /// Public URL of an object in the configured bucket.
    pub fn public_url(&self, object_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.links_prefix.trim_end_matches('/'),
            self.bucket_name,
            object_name.trim_start_matches('/')
        )
    }
}

impl Default for MinioConfig {
    fn default() -> Self {
        Self {
            endpoint: "localhost:9000".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            bucket_name: "storefront-images".to_string(),
            links_prefix: "http://127.0.0.1:9000".to_string(),
            region: Some("us-east-1".to_string()),
            secure: false,
        }
    }
}
