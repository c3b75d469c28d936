use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::info;

use crate::dto::product_dto::{ProductQuery, ProductRequest};
use crate::handler::multipart::{json_part, read_form};
use crate::service::product_service::ProductService;
use crate::util::error::HandlerError;
use crate::util::extract::object_id;
use crate::util::response::ok;

pub type ProductState = Arc<dyn ProductService>;

/// Image uploads arrive in fields named `images` (or `image0`, `image1`, ...).
const IMAGE_FIELD: &str = "image";

pub async fn list_products_handler(
    State(service): State<ProductState>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let products = service.list_products(query).await?;
    info!("[list_products_handler] Returning {} products", products.len());
    Ok(ok(products))
}

pub async fn create_product_handler(
    State(service): State<ProductState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let form = read_form(multipart).await?;
    let request: ProductRequest = json_part(&form)?;
    let product = service
        .create_product(request, form.files_with_prefix(IMAGE_FIELD))
        .await?;
    Ok((StatusCode::CREATED, ok(product)))
}

pub async fn get_product_handler(
    State(service): State<ProductState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = object_id(&id, "product")?;
    Ok(ok(service.get_product(id).await?))
}

pub async fn update_product_handler(
    State(service): State<ProductState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let id = object_id(&id, "product")?;
    let form = read_form(multipart).await?;
    let request: ProductRequest = json_part(&form)?;
    let product = service
        .update_product(id, request, form.files_with_prefix(IMAGE_FIELD))
        .await?;
    Ok(ok(product))
}

pub async fn delete_product_handler(
    State(service): State<ProductState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = object_id(&id, "product")?;
    service.delete_product(id).await?;
    Ok(ok(()))
}
