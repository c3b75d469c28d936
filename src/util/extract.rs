use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use validator::Validate;

use crate::util::error::HandlerError;
use crate::util::time::DateRange;

/// JSON body that is deserialized and then checked with `validator`.
/// Both failures answer with the standard error envelope and a 400.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = HandlerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| HandlerError::bad_request(rejection.body_text()))?;
        value
            .validate()
            .map_err(|e| HandlerError::validation(format!("Validation error: {}", e)))?;
        Ok(ValidatedJson(value))
    }
}

/// Parse `startDate` / `endDate` from query parameters.
pub fn date_range(params: &HashMap<String, String>) -> Result<DateRange, HandlerError> {
    DateRange::parse(
        params.get("startDate").map(String::as_str),
        params.get("endDate").map(String::as_str),
    )
    .map_err(HandlerError::bad_request)
}

/// Parse a 24-hex-digit id from a path segment.
pub fn object_id(raw: &str, what: &str) -> Result<bson::oid::ObjectId, HandlerError> {
    bson::oid::ObjectId::parse_str(raw.trim())
        .map_err(|_| HandlerError::bad_request(format!("Invalid {} id: {}", what, raw)))
}
