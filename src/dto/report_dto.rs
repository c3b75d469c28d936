use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockProduct {
    pub id: Option<ObjectId>,
    pub name: String,
    pub code: Option<String>,
    pub stock: i64,
}

/// Dashboard figures over a date range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub quote_count: u64,
    /// Keyed by aggregate line status.
    pub quotes_by_status: BTreeMap<String, u64>,
    /// Keyed by the user-set quote stage.
    pub quotes_by_stage: BTreeMap<String, u64>,
    pub quoted_total: f64,
    pub spent_total: f64,
    pub special_order_count: u64,
    pub special_orders_by_status: BTreeMap<String, u64>,
    pub low_stock_threshold: i64,
    pub low_stock_products: Vec<LowStockProduct>,
}
