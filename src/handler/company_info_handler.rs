use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::dto::company_info_dto::CompanyInfoRequest;
use crate::handler::multipart::{json_part, read_form};
use crate::service::company_info_service::{CompanyImages, CompanyInfoService};
use crate::util::error::HandlerError;
use crate::util::extract::object_id;
use crate::util::response::ok;

pub type CompanyInfoState = Arc<dyn CompanyInfoService>;

pub async fn list_info_handler(State(service): State<CompanyInfoState>) -> Result<impl IntoResponse, HandlerError> {
    Ok(ok(service.list_info().await?))
}

/// `data` is null when no company info has been saved yet.
pub async fn current_info_handler(State(service): State<CompanyInfoState>) -> Result<impl IntoResponse, HandlerError> {
    Ok(ok(service.current().await?))
}

pub async fn create_info_handler(
    State(service): State<CompanyInfoState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let form = read_form(multipart).await?;
    let request: CompanyInfoRequest = json_part(&form)?;
    let info = service.create_info(request, CompanyImages::from_form(&form)).await?;
    Ok((StatusCode::CREATED, ok(info)))
}

pub async fn get_info_handler(
    State(service): State<CompanyInfoState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = object_id(&id, "company info")?;
    Ok(ok(service.get_info(id).await?))
}

pub async fn update_info_handler(
    State(service): State<CompanyInfoState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let id = object_id(&id, "company info")?;
    let form = read_form(multipart).await?;
    let request: CompanyInfoRequest = json_part(&form)?;
    Ok(ok(service.update_info(id, request, CompanyImages::from_form(&form)).await?))
}

pub async fn delete_info_handler(
    State(service): State<CompanyInfoState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = object_id(&id, "company info")?;
    service.delete_info(id).await?;
    Ok(ok(()))
}
