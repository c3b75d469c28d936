use axum::{
    routing::{get, put},
    Router,
};

use crate::handler::category_handler::{
    add_child_handler, add_subchild_handler, create_main_handler, delete_child_handler, delete_main_handler,
    delete_subchild_handler, get_main_handler, list_children_handler, list_main_handler, list_subchildren_handler,
    rename_child_handler, rename_main_handler, rename_subchild_handler, tree_handler, CategoryState,
};

pub fn category_router(service: CategoryState) -> Router {
    Router::new()
        .route("/categories/tree", get(tree_handler))
        .route("/categories/main", get(list_main_handler).post(create_main_handler))
        .route(
            "/categories/main/{id}",
            get(get_main_handler).put(rename_main_handler).delete(delete_main_handler),
        )
        .route(
            "/categories/main/{id}/children",
            get(list_children_handler).post(add_child_handler),
        )
        .route(
            "/categories/main/{id}/children/{child_id}",
            put(rename_child_handler).delete(delete_child_handler),
        )
        .route(
            "/categories/main/{id}/children/{child_id}/subchildren",
            get(list_subchildren_handler).post(add_subchild_handler),
        )
        .route(
            "/categories/main/{id}/children/{child_id}/subchildren/{sub_id}",
            put(rename_subchild_handler).delete(delete_subchild_handler),
        )
        .with_state(service)
}
