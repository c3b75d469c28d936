use std::sync::Arc;
use tracing::{info, warn};

use crate::dto::file_dto::UploadedFile;
use crate::util::error::ServiceError;
use crate::util::minio::{image_content_type, object_key, ObjectStorage};

/// The object store, when one is configured.
pub type Storage = Option<Arc<dyn ObjectStorage>>;

fn require(storage: &Storage) -> Result<&Arc<dyn ObjectStorage>, ServiceError> {
    storage.as_ref().ok_or_else(|| {
        ServiceError::Configuration(
            "Image storage is not configured. Set MINIO_ENDPOINT, MINIO_ACCESS_KEY, \
             MINIO_SECRET_KEY and MINIO_BUCKET_NAME to enable uploads"
                .to_string(),
        )
    })
}

/// Upload images under `folder` and return their public URLs in order.
/// Every file is checked before anything is written; if an upload fails the
/// ones already stored are removed again.
pub async fn store_images(storage: &Storage, folder: &str, files: &[UploadedFile]) -> Result<Vec<String>, ServiceError> {
    if files.is_empty() {
        return Ok(Vec::new());
    }
    let store = require(storage)?;

    let mut typed = Vec::with_capacity(files.len());
    for file in files {
        let content_type = image_content_type(file.file_name.as_deref(), file.content_type.as_deref())
            .ok_or_else(|| {
                ServiceError::InvalidInput(format!(
                    "'{}' is not an image",
                    file.file_name.as_deref().unwrap_or(&file.field)
                ))
            })?;
        if file.data.is_empty() {
            return Err(ServiceError::InvalidInput(format!("Field '{}' holds an empty file", file.field)));
        }
        typed.push((file, content_type));
    }

    let mut stored: Vec<String> = Vec::with_capacity(typed.len());
    for (file, content_type) in typed {
        let key = object_key(folder, file.file_name.as_deref(), Some(&content_type));
        if let Err(e) = store.put_object(&key, file.data.to_vec(), Some(&content_type)).await {
            let urls: Vec<String> = stored.iter().map(|k| store.public_url(k)).collect();
            remove_images(storage, &urls).await;
            return Err(e.into());
        }
        stored.push(key);
    }
    info!("Stored {} image(s) under {}", stored.len(), folder);
    Ok(stored.iter().map(|key| store.public_url(key)).collect())
}

/// Remove images by public URL. Best effort: failures are only logged, and
/// URLs that do not belong to the store are ignored.
pub async fn remove_images(storage: &Storage, urls: &[String]) {
    let Some(store) = storage else {
        return;
    };
    for url in urls {
        let Some(key) = store.object_name_of(url) else {
            continue;
        };
        if let Err(e) = store.remove_object(&key).await {
            warn!(object = %key, "Failed to remove image: {}", e);
        }
    }
}

/// Stored URLs that are not in `keep`.
pub fn dropped(current: &[String], keep: &[String]) -> Vec<String> {
    current.iter().filter(|url| !keep.contains(*url)).cloned().collect()
}
