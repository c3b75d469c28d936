use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::service::report_service::ReportService;
use crate::util::error::HandlerError;
use crate::util::extract::date_range;
use crate::util::response::ok;

pub type ReportState = Arc<dyn ReportService>;

pub async fn summary_handler(
    State(service): State<ReportState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, HandlerError> {
    let range = date_range(&params)?;
    let threshold = match params.get("lowStockThreshold").map(|s| s.trim()).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => Some(
            raw.parse::<i64>()
                .map_err(|_| HandlerError::bad_request(format!("lowStockThreshold must be an integer, got '{}'", raw)))?,
        ),
    };
    Ok(ok(service.summary(range, threshold).await?))
}
