use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::dto::category_dto::CategoryNameRequest;
use crate::service::category_service::CategoryService;
use crate::util::error::HandlerError;
use crate::util::extract::{object_id, ValidatedJson};
use crate::util::response::ok;

pub type CategoryState = Arc<dyn CategoryService>;

pub async fn tree_handler(State(service): State<CategoryState>) -> Result<impl IntoResponse, HandlerError> {
    Ok(ok(service.tree().await?))
}

pub async fn list_main_handler(State(service): State<CategoryState>) -> Result<impl IntoResponse, HandlerError> {
    Ok(ok(service.list_main().await?))
}

pub async fn create_main_handler(
    State(service): State<CategoryState>,
    ValidatedJson(request): ValidatedJson<CategoryNameRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let created = service.create_main(&request.name).await?;
    Ok((StatusCode::CREATED, ok(created)))
}

pub async fn get_main_handler(
    State(service): State<CategoryState>,
    Path(main): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let main = object_id(&main, "category")?;
    Ok(ok(service.get_main(main).await?))
}

pub async fn rename_main_handler(
    State(service): State<CategoryState>,
    Path(main): Path<String>,
    ValidatedJson(request): ValidatedJson<CategoryNameRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let main = object_id(&main, "category")?;
    Ok(ok(service.rename_main(main, &request.name).await?))
}

pub async fn delete_main_handler(
    State(service): State<CategoryState>,
    Path(main): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let main = object_id(&main, "category")?;
    Ok(ok(service.delete_main(main).await?))
}

pub async fn list_children_handler(
    State(service): State<CategoryState>,
    Path(main): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let main = object_id(&main, "category")?;
    Ok(ok(service.list_children(main).await?))
}

pub async fn add_child_handler(
    State(service): State<CategoryState>,
    Path(main): Path<String>,
    ValidatedJson(request): ValidatedJson<CategoryNameRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let main = object_id(&main, "category")?;
    let created = service.add_child(main, &request.name).await?;
    Ok((StatusCode::CREATED, ok(created)))
}

pub async fn rename_child_handler(
    State(service): State<CategoryState>,
    Path((main, child)): Path<(String, String)>,
    ValidatedJson(request): ValidatedJson<CategoryNameRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let main = object_id(&main, "category")?;
    let child = object_id(&child, "child category")?;
    Ok(ok(service.rename_child(main, child, &request.name).await?))
}

pub async fn delete_child_handler(
    State(service): State<CategoryState>,
    Path((main, child)): Path<(String, String)>,
) -> Result<impl IntoResponse, HandlerError> {
    let main = object_id(&main, "category")?;
    let child = object_id(&child, "child category")?;
    Ok(ok(service.delete_child(main, child).await?))
}

pub async fn list_subchildren_handler(
    State(service): State<CategoryState>,
    Path((main, child)): Path<(String, String)>,
) -> Result<impl IntoResponse, HandlerError> {
    let main = object_id(&main, "category")?;
    let child = object_id(&child, "child category")?;
    Ok(ok(service.list_subchildren(main, child).await?))
}

pub async fn add_subchild_handler(
    State(service): State<CategoryState>,
    Path((main, child)): Path<(String, String)>,
    ValidatedJson(request): ValidatedJson<CategoryNameRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let main = object_id(&main, "category")?;
    let child = object_id(&child, "child category")?;
    let created = service.add_subchild(main, child, &request.name).await?;
    Ok((StatusCode::CREATED, ok(created)))
}

pub async fn rename_subchild_handler(
    State(service): State<CategoryState>,
    Path((main, child, sub)): Path<(String, String, String)>,
    ValidatedJson(request): ValidatedJson<CategoryNameRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let main = object_id(&main, "category")?;
    let child = object_id(&child, "child category")?;
    let sub = object_id(&sub, "subchild category")?;
    Ok(ok(service.rename_subchild(main, child, sub, &request.name).await?))
}

pub async fn delete_subchild_handler(
    State(service): State<CategoryState>,
    Path((main, child, sub)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, HandlerError> {
    let main = object_id(&main, "category")?;
    let child = object_id(&child, "child category")?;
    let sub = object_id(&sub, "subchild category")?;
    Ok(ok(service.delete_subchild(main, child, sub).await?))
}
