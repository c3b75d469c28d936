use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::quote::{DocumentKind, LineItemStatus, Quote, QuoteLineItem, QuoteStage};
use crate::util::response::BulkOutcome;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    pub product_id: Option<String>,

    pub product_code: Option<String>,

    #[validate(length(min = 1, max = 200))]
    pub name: String,

    pub color: Option<String>,

    pub size: Option<String>,

    #[validate(range(min = 0, max = 1_000_000))]
    pub quantity: i64,

    #[validate(range(min = 0.0, max = 1_000_000_000.0))]
    pub unit_price: f64,

    pub status: Option<LineItemStatus>,
}

impl From<LineItemRequest> for QuoteLineItem {
    fn from(req: LineItemRequest) -> Self {
        let trimmed = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        QuoteLineItem {
            product_id: trimmed(req.product_id),
            product_code: trimmed(req.product_code),
            name: req.name.trim().to_string(),
            color: trimmed(req.color),
            size: trimmed(req.size),
            quantity: req.quantity,
            unit_price: req.unit_price,
            status: req.status,
        }
    }
}

/// Body of `POST /api/quotes`. Any `status` field sent by the client is
/// ignored; the aggregate is always derived from the lines.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteRequest {
    #[validate(length(min = 2, max = 100))]
    pub customer_name: String,

    #[validate(length(min = 6, max = 20))]
    pub customer_phone: String,

    #[validate(email)]
    pub customer_email: Option<String>,

    pub customer_address: Option<String>,

    #[validate(length(max = 2000))]
    pub note: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<LineItemRequest>,

    pub quote_status: Option<QuoteStage>,
}

/// Body of `PUT /api/quotes/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuoteRequest {
    #[validate(length(min = 2, max = 100))]
    pub customer_name: Option<String>,

    #[validate(length(min = 6, max = 20))]
    pub customer_phone: Option<String>,

    #[validate(email)]
    pub customer_email: Option<String>,

    pub customer_address: Option<String>,

    #[validate(length(max = 2000))]
    pub note: Option<String>,

    #[validate(nested)]
    pub items: Option<Vec<LineItemRequest>>,

    pub quote_status: Option<QuoteStage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetLineStatusRequest {
    pub status: LineItemStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkLineStatusRequest {
    #[validate(length(min = 1, max = 500))]
    pub indices: Vec<usize>,

    pub status: LineItemStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetStageRequest {
    pub quote_status: QuoteStage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IssueDocumentRequest {
    /// `YYYY-MM-DD`; today when absent.
    #[validate(length(equal = 10))]
    pub date: Option<String>,

    /// Invoices only; issue date plus the configured term when absent.
    #[validate(length(equal = 10))]
    pub due_date: Option<String>,

    /// Assign a fresh number even if one was issued before.
    #[serde(default)]
    pub regenerate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkDeleteRequest {
    #[validate(length(min = 1, max = 500))]
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextNumberResponse {
    pub kind: DocumentKind,
    pub date: String,
    pub number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkLineStatusResponse {
    pub quote: Quote,
    #[serde(flatten)]
    pub outcome: BulkOutcome,
}

/// Stages the admin UI should show as checked for a chosen status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOptions {
    pub status: LineItemStatus,
    pub implied: Vec<LineItemStatus>,
}

impl From<LineItemStatus> for StageOptions {
    fn from(status: LineItemStatus) -> Self {
        StageOptions {
            status,
            implied: status.stages_through(),
        }
    }
}
