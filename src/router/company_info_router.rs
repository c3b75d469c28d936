use axum::{routing::get, Router};

use crate::handler::company_info_handler::{
    create_info_handler, current_info_handler, delete_info_handler, get_info_handler, list_info_handler,
    update_info_handler, CompanyInfoState,
};

pub fn company_info_router(service: CompanyInfoState) -> Router {
    Router::new()
        .route("/company-info", get(list_info_handler).post(create_info_handler))
        .route("/company-info/current", get(current_info_handler))
        .route(
            "/company-info/{id}",
            get(get_info_handler).put(update_info_handler).delete(delete_info_handler),
        )
        .with_state(service)
}
