use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::special_order::SpecialOrderStatus;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SpecialOrderRequest {
    #[validate(length(min = 2, max = 100))]
    pub customer_name: String,

    #[validate(length(min = 6, max = 20))]
    pub customer_phone: String,

    #[validate(email)]
    pub customer_email: Option<String>,

    #[validate(length(min = 1, max = 200))]
    pub product_name: String,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(range(min = 1))]
    pub quantity: i64,

    #[validate(range(min = 0.0))]
    pub budget: Option<f64>,

    pub status: Option<SpecialOrderStatus>,

    #[validate(length(max = 2000))]
    pub admin_note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SpecialOrderStatusRequest {
    pub status: SpecialOrderStatus,

    #[validate(length(max = 2000))]
    pub admin_note: Option<String>,
}
