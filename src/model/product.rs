use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub price: f64,
    pub compare_at_price: Option<f64>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    /// Deepest category the product is filed under.
    pub category_id: Option<ObjectId>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Trim, drop blanks and drop repeats, keeping the first occurrence in place.
pub fn normalize_options(values: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim();
        if value.is_empty() || seen.iter().any(|v| v.eq_ignore_ascii_case(value)) {
            continue;
        }
        seen.push(value.to_string());
    }
    seen
}
