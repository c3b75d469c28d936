use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handler::quote_handler::{
    bulk_delete_handler, bulk_line_status_handler, create_quote_handler, delete_quote_handler, export_handler,
    get_quote_handler, issue_document_handler, line_statuses_handler, list_quotes_handler, next_number_handler,
    set_line_status_handler, set_stage_handler, update_quote_handler, QuoteState,
};

pub fn quote_router(service: QuoteState) -> Router {
    Router::new()
        .route("/quotes", get(list_quotes_handler).post(create_quote_handler))
        .route("/quotes/bulk-delete", post(bulk_delete_handler))
        .route("/quotes/next-number", get(next_number_handler))
        .route("/quotes/statuses", get(line_statuses_handler))
        .route(
            "/quotes/{id}",
            get(get_quote_handler).put(update_quote_handler).delete(delete_quote_handler),
        )
        .route("/quotes/{id}/stage", put(set_stage_handler))
        .route("/quotes/{id}/items/status", put(bulk_line_status_handler))
        .route("/quotes/{id}/items/{index}/status", put(set_line_status_handler))
        .route("/quotes/{id}/documents/{kind}", post(issue_document_handler))
        .route("/quotes/{id}/export", get(export_handler))
        .with_state(service)
}
