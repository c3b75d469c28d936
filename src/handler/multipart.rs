use axum::extract::Multipart;
use bytes::BytesMut;
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use validator::Validate;

use crate::dto::file_dto::{MultipartForm, UploadedFile};
use crate::util::error::HandlerError;

/// Drain a multipart body. The `json` field is kept as raw bytes, every
/// other field that carries a file name is collected as an upload, and
/// plain text fields are ignored.
pub async fn read_form(mut multipart: Multipart) -> Result<MultipartForm, HandlerError> {
    let mut form = MultipartForm::default();

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        error!("Error getting next multipart field: {}", e);
        HandlerError::bad_request(format!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();
        debug!("Processing multipart field: {}", name);

        if name == "json" {
            let data = field
                .bytes()
                .await
                .map_err(|e| HandlerError::bad_request(format!("Failed to read json field: {}", e)))?;
            form.json = Some(data);
            continue;
        }

        let Some(file_name) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };
        let content_type = field.content_type().map(|s| s.to_string());
        let mut buf = BytesMut::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| HandlerError::bad_request(format!("Failed to read file chunk: {}", e)))?
        {
            buf.extend_from_slice(&chunk);
        }
        debug!("Received file {} ({} bytes) in field {}", file_name, buf.len(), name);
        form.files.push(UploadedFile {
            field: name,
            file_name: Some(file_name),
            content_type,
            data: buf.freeze(),
        });
    }

    Ok(form)
}

/// Deserialize and validate the `json` part of a form.
pub fn json_part<T>(form: &MultipartForm) -> Result<T, HandlerError>
where
    T: DeserializeOwned + Validate,
{
    let data = form
        .json
        .as_ref()
        .ok_or_else(|| HandlerError::bad_request("Missing json field in multipart form"))?;
    let value: T = serde_json::from_slice(data).map_err(|e| HandlerError::bad_request(format!("Invalid JSON: {}", e)))?;
    value
        .validate()
        .map_err(|e| HandlerError::validation(format!("Validation error: {}", e)))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::category_dto::CategoryNameRequest;
    use bytes::Bytes;

    #[test]
    fn test_missing_json_part() {
        let err = json_part::<CategoryNameRequest>(&MultipartForm::default()).unwrap_err();
        assert!(err.message.contains("json"));
    }

    #[test]
    fn test_json_part_is_validated() {
        let form = MultipartForm {
            json: Some(Bytes::from_static(br#"{"name":""}"#)),
            files: vec![],
        };
        let err = json_part::<CategoryNameRequest>(&form).unwrap_err();
        assert_eq!(err.error, crate::util::error::HandlerErrorKind::Validation);
    }
}
