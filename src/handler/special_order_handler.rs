use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::dto::special_order_dto::{SpecialOrderRequest, SpecialOrderStatusRequest};
use crate::service::special_order_service::SpecialOrderService;
use crate::util::error::HandlerError;
use crate::util::extract::{date_range, object_id, ValidatedJson};
use crate::util::response::ok;

pub type SpecialOrderState = Arc<dyn SpecialOrderService>;

pub async fn list_orders_handler(
    State(service): State<SpecialOrderState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, HandlerError> {
    let range = date_range(&params)?;
    Ok(ok(service.list_orders(range).await?))
}

pub async fn create_order_handler(
    State(service): State<SpecialOrderState>,
    ValidatedJson(request): ValidatedJson<SpecialOrderRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let order = service.create_order(request).await?;
    Ok((StatusCode::CREATED, ok(order)))
}

pub async fn get_order_handler(
    State(service): State<SpecialOrderState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = object_id(&id, "special order")?;
    Ok(ok(service.get_order(id).await?))
}

pub async fn update_order_handler(
    State(service): State<SpecialOrderState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<SpecialOrderRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = object_id(&id, "special order")?;
    Ok(ok(service.update_order(id, request).await?))
}

pub async fn update_order_status_handler(
    State(service): State<SpecialOrderState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<SpecialOrderStatusRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = object_id(&id, "special order")?;
    Ok(ok(service.update_status(id, request).await?))
}

pub async fn delete_order_handler(
    State(service): State<SpecialOrderState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = object_id(&id, "special order")?;
    service.delete_order(id).await?;
    Ok(ok(()))
}
