use serde::{Deserialize, Serialize};
use validator::Validate;

/// JSON part of the product multipart form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(min = 1, max = 64))]
    pub code: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(range(min = 0.0))]
    pub price: f64,

    #[validate(range(min = 0.0))]
    pub compare_at_price: Option<f64>,

    /// Left unchanged on update when absent.
    pub stock: Option<i64>,

    #[serde(default)]
    pub colors: Vec<String>,

    #[serde(default)]
    pub sizes: Vec<String>,

    /// On update: existing image URLs to keep. Ignored on create.
    #[serde(default)]
    pub images: Vec<String>,

    /// Hex id of the deepest category.
    pub category_id: Option<String>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category_id: Option<String>,
    /// Case-insensitive match on name or code.
    pub search: Option<String>,
}
