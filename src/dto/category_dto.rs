use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryNameRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// What a category delete took with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDeleteOutcome {
    pub removed_categories: u64,
    pub detached_products: u64,
}
