use axum::{
    routing::{get, put},
    Router,
};

use crate::handler::special_order_handler::{
    create_order_handler, delete_order_handler, get_order_handler, list_orders_handler, update_order_handler,
    update_order_status_handler, SpecialOrderState,
};

pub fn special_order_router(service: SpecialOrderState) -> Router {
    Router::new()
        .route("/special-orders", get(list_orders_handler).post(create_order_handler))
        .route(
            "/special-orders/{id}",
            get(get_order_handler).put(update_order_handler).delete(delete_order_handler),
        )
        .route("/special-orders/{id}/status", put(update_order_status_handler))
        .with_state(service)
}
