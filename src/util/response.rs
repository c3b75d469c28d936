use axum::Json;
use serde::{Deserialize, Serialize};

/// Envelope every endpoint answers with: `{ success, data?, error? }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

pub type ApiJson<T> = Json<ApiResponse<T>>;

/// Wrap a payload in a successful envelope.
pub fn ok<T>(data: T) -> ApiJson<T> {
    Json(ApiResponse::success(data))
}

/// Outcome of an operation applied to several records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub succeeded: u64,
    pub failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_omits_error() {
        let body = serde_json::to_value(ApiResponse::success(5)).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "data": 5 }));
    }

    #[test]
    fn test_failure_omits_data() {
        let body = serde_json::to_value(ApiResponse::<()>::failure("boom")).unwrap();
        assert_eq!(body, serde_json::json!({ "success": false, "error": "boom" }));
    }
}
