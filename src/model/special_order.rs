use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialOrderStatus {
    #[default]
    New,
    Reviewing,
    Quoted,
    Ordered,
    Completed,
    Cancelled,
}

impl SpecialOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialOrderStatus::New => "new",
            SpecialOrderStatus::Reviewing => "reviewing",
            SpecialOrderStatus::Quoted => "quoted",
            SpecialOrderStatus::Ordered => "ordered",
            SpecialOrderStatus::Completed => "completed",
            SpecialOrderStatus::Cancelled => "cancelled",
        }
    }
}

/// A customer request for something not in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialOrder {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub product_name: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub budget: Option<f64>,
    #[serde(default)]
    pub status: SpecialOrderStatus,
    pub admin_note: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}
