use async_trait::async_trait;
use minio::s3::args::{BucketExistsArgs, MakeBucketArgs, PutObjectArgs, RemoveObjectArgs};
use minio::s3::client::{Client, ClientBuilder};
use minio::s3::creds::StaticProvider;
use minio::s3::http::BaseUrl;
use std::io::Cursor;
use tracing::{debug, error, info, instrument, warn};

use crate::config::MinioConfig;
use crate::util::error::ServiceError;

/// Where uploaded images go. The MinIO client is the production
/// implementation; tests plug in an in-memory one.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put_object(
        &self,
        object_name: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), MinioError>;

    async fn remove_object(&self, object_name: &str) -> Result<(), MinioError>;

    /// Public link recorded on products and company info.
    fn public_url(&self, object_name: &str) -> String;

    /// Inverse of `public_url`; `None` for links this store did not produce.
    fn object_name_of(&self, url: &str) -> Option<String> {
        let base = self.public_url("");
        url.strip_prefix(base.as_str())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone)]
pub struct MinioService {
    client: Client,
    pub config: MinioConfig,
}

impl MinioService {
    #[instrument(skip(config), fields(endpoint = %config.endpoint, bucket = %config.bucket_name))]
    pub async fn new(config: MinioConfig) -> Result<Self, MinioError> {
        info!("Initializing MinIO service");

        config.validate().map_err(|e| {
            error!("MinIO configuration validation failed: {}", e);
            MinioError::ConfigError(e.to_string())
        })?;

        let base_url = config.endpoint_url().parse::<BaseUrl>().map_err(|e| {
            error!("Failed to parse MinIO endpoint URL: {}", e);
            MinioError::ConnectionError(format!("Invalid endpoint URL: {}", e))
        })?;

        let static_provider = StaticProvider::new(&config.access_key, &config.secret_key, None);

        let client = ClientBuilder::new(base_url)
            .provider(Some(Box::new(static_provider)))
            .build()
            .map_err(|e| {
                error!("Failed to create MinIO client: {}", e);
                MinioError::ConnectionError(format!("Client creation failed: {}", e))
            })?;

        let service = Self { client, config };
        service.ensure_bucket_exists().await?;

        info!("MinIO service initialized successfully");
        Ok(service)
    }

    #[instrument(skip(self))]
    async fn ensure_bucket_exists(&self) -> Result<(), MinioError> {
        let bucket = &self.config.bucket_name;
        let exists_args = BucketExistsArgs::new(bucket).map_err(|e| MinioError::InvalidArguments(e.to_string()))?;

        let exists = self.client.bucket_exists(&exists_args).await.map_err(|e| {
            error!("Failed to check if bucket exists: {}", e);
            MinioError::OperationError(format!("Bucket exists check failed: {}", e))
        })?;
        if exists {
            debug!("Bucket '{}' already exists", bucket);
            return Ok(());
        }

        warn!("Bucket '{}' does not exist, creating it", bucket);
        let make_args = MakeBucketArgs::new(bucket).map_err(|e| MinioError::InvalidArguments(e.to_string()))?;
        self.client.make_bucket(&make_args).await.map_err(|e| {
            error!("Failed to create bucket '{}': {}", bucket, e);
            MinioError::OperationError(format!("Bucket creation failed: {}", e))
        })?;

        info!("Created bucket '{}'", bucket);
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for MinioService {
    #[instrument(skip(self, data), fields(object_name = %object_name, size = data.len()))]
    async fn put_object(
        &self,
        object_name: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), MinioError> {
        let bucket_name = self.config.bucket_name.clone();
        let object_name = object_name.to_string();
        let client = self.client.clone();
        let content_type = content_type.map(str::to_string);

        // The upload borrows a reader for its whole duration, so it runs on
        // a blocking thread with its own executor.
        tokio::task::spawn_blocking(move || {
            let mut reader = Cursor::new(data);
            let size = reader.get_ref().len();

            let mut args = PutObjectArgs::new(&bucket_name, &object_name, &mut reader, Some(size), None)
                .map_err(|e| MinioError::InvalidArguments(e.to_string()))?;
            if let Some(ref ct) = content_type {
                args.content_type = ct;
            }

            futures::executor::block_on(client.put_object(&mut args))
                .map_err(|e| MinioError::OperationError(format!("Upload failed: {}", e)))?;

            info!("Uploaded object '{}'", object_name);
            Ok(())
        })
        .await
        .map_err(|e| {
            error!("Failed to join blocking task for put_object: {}", e);
            MinioError::OperationError(format!("Join error: {}", e))
        })?
    }

    #[instrument(skip(self), fields(object_name = %object_name))]
    async fn remove_object(&self, object_name: &str) -> Result<(), MinioError> {
        let args = RemoveObjectArgs::new(&self.config.bucket_name, object_name)
            .map_err(|e| MinioError::InvalidArguments(e.to_string()))?;

        self.client.remove_object(&args).await.map_err(|e| {
            error!("Failed to delete object '{}': {}", object_name, e);
            MinioError::OperationError(format!("Delete failed: {}", e))
        })?;

        info!("Deleted object '{}'", object_name);
        Ok(())
    }

    fn public_url(&self, object_name: &str) -> String {
        self.config.public_url(object_name)
    }
}

/// Object key for a new upload: `{folder}/{uuid}.{ext}`. The extension comes
/// from the original file name, or from the content type when there is none.
pub fn object_key(folder: &str, file_name: Option<&str>, content_type: Option<&str>) -> String {
    let from_name = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));
    let extension = from_name.or_else(|| {
        content_type
            .and_then(|ct| mime_guess::get_mime_extensions_str(ct))
            .and_then(|exts| exts.first())
            .map(|ext| ext.to_string())
    });
    let id = uuid::Uuid::new_v4();
    match extension {
        Some(ext) => format!("{}/{}.{}", folder.trim_matches('/'), id, ext),
        None => format!("{}/{}", folder.trim_matches('/'), id),
    }
}

/// Content type of an upload: the declared one, else guessed from the name.
pub fn image_content_type(file_name: Option<&str>, declared: Option<&str>) -> Option<String> {
    declared
        .map(str::to_string)
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream")
        .or_else(|| {
            file_name
                .and_then(|name| mime_guess::from_path(name).first())
                .map(|mime| mime.essence_str().to_string())
        })
        .filter(|ct| ct.starts_with("image/"))
}

#[derive(Debug, thiserror::Error)]
pub enum MinioError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Operation error: {0}")]
    OperationError(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

impl From<MinioError> for ServiceError {
    fn from(err: MinioError) -> Self {
        match err {
            MinioError::ConfigError(msg) => ServiceError::Configuration(msg),
            other => ServiceError::Storage(other.to_string()),
        }
    }
}
