use axum::{routing::get, Router};

use crate::handler::product_handler::{
    create_product_handler, delete_product_handler, get_product_handler, list_products_handler,
    update_product_handler, ProductState,
};

pub fn product_router(service: ProductState) -> Router {
    Router::new()
        .route("/products", get(list_products_handler).post(create_product_handler))
        .route(
            "/products/{id}",
            get(get_product_handler)
                .put(update_product_handler)
                .delete(delete_product_handler),
        )
        .with_state(service)
}
