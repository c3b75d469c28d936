use axum::{routing::get, Router};

use crate::handler::report_handler::{summary_handler, ReportState};

pub fn report_router(service: ReportState) -> Router {
    Router::new()
        .route("/reports/summary", get(summary_handler))
        .with_state(service)
}
