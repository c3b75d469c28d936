use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::dto::quote_dto::{
    BulkDeleteRequest, BulkLineStatusRequest, BulkLineStatusResponse, CreateQuoteRequest, IssueDocumentRequest,
    NextNumberResponse, SetLineStatusRequest, SetStageRequest, StageOptions, UpdateQuoteRequest,
};
use crate::model::quote::{DocumentKind, LineItemStatus};
use crate::service::quote_service::QuoteService;
use crate::util::error::HandlerError;
use crate::util::export::ExportFormat;
use crate::util::extract::{date_range, object_id, ValidatedJson};
use crate::util::response::ok;
use crate::util::time::{format_date, parse_date, today};

pub type QuoteState = Arc<dyn QuoteService>;

fn document_kind(raw: &str) -> Result<DocumentKind, HandlerError> {
    DocumentKind::parse(raw).ok_or_else(|| {
        HandlerError::bad_request(format!("Unknown document kind '{}', expected quote, invoice or receipt", raw))
    })
}

/// `items=0,2,5` as line indices; absent or blank means every line.
fn item_selection(raw: Option<&String>) -> Result<Vec<usize>, HandlerError> {
    let Some(raw) = raw.map(|s| s.trim()).filter(|s| !s.is_empty()) else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| HandlerError::bad_request(format!("Invalid item index '{}'", s)))
        })
        .collect()
}

pub async fn list_quotes_handler(
    State(service): State<QuoteState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, HandlerError> {
    let range = date_range(&params)?;
    let quotes = service.list_quotes(range).await?;
    info!("[list_quotes_handler] Returning {} quotes", quotes.len());
    Ok(ok(quotes))
}

pub async fn create_quote_handler(
    State(service): State<QuoteState>,
    ValidatedJson(request): ValidatedJson<CreateQuoteRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let quote = service.create_quote(request).await?;
    Ok((StatusCode::CREATED, ok(quote)))
}

pub async fn get_quote_handler(
    State(service): State<QuoteState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = object_id(&id, "quote")?;
    Ok(ok(service.get_quote(id).await?))
}

pub async fn update_quote_handler(
    State(service): State<QuoteState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateQuoteRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = object_id(&id, "quote")?;
    Ok(ok(service.update_quote(id, request).await?))
}

pub async fn delete_quote_handler(
    State(service): State<QuoteState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = object_id(&id, "quote")?;
    service.delete_quote(id).await?;
    Ok(ok(()))
}

pub async fn bulk_delete_handler(
    State(service): State<QuoteState>,
    ValidatedJson(request): ValidatedJson<BulkDeleteRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(ok(service.bulk_delete(request.ids).await?))
}

/// Every line status with the earlier stages it implies.
pub async fn line_statuses_handler() -> impl IntoResponse {
    let options: Vec<StageOptions> = LineItemStatus::ALL.into_iter().map(StageOptions::from).collect();
    ok(options)
}

pub async fn next_number_handler(
    State(service): State<QuoteState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, HandlerError> {
    let kind = document_kind(params.get("kind").map(String::as_str).unwrap_or("quote"))?;
    let date = match params.get("date").map(|s| s.trim()).filter(|s| !s.is_empty()) {
        None => today(),
        Some(raw) => parse_date(raw)
            .ok_or_else(|| HandlerError::bad_request(format!("date must be formatted as YYYY-MM-DD, got '{}'", raw)))?,
    };
    let number = service.next_document_number(kind, date).await;
    Ok(ok(NextNumberResponse {
        kind,
        date: format_date(date),
        number,
    }))
}

pub async fn set_stage_handler(
    State(service): State<QuoteState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<SetStageRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = object_id(&id, "quote")?;
    Ok(ok(service.set_quote_stage(id, request.quote_status).await?))
}

pub async fn set_line_status_handler(
    State(service): State<QuoteState>,
    Path((id, index)): Path<(String, String)>,
    ValidatedJson(request): ValidatedJson<SetLineStatusRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = object_id(&id, "quote")?;
    let index: usize = index
        .trim()
        .parse()
        .map_err(|_| HandlerError::bad_request(format!("Invalid item index '{}'", index)))?;
    Ok(ok(service.set_line_item_status(id, index, request.status).await?))
}

pub async fn bulk_line_status_handler(
    State(service): State<QuoteState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<BulkLineStatusRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = object_id(&id, "quote")?;
    let (quote, outcome) = service.set_line_items_status(id, request.indices, request.status).await?;
    Ok(ok(BulkLineStatusResponse { quote, outcome }))
}

/// The body is optional; an empty one issues with today's date.
pub async fn issue_document_handler(
    State(service): State<QuoteState>,
    Path((id, kind)): Path<(String, String)>,
    body: Bytes,
) -> Result<impl IntoResponse, HandlerError> {
    let id = object_id(&id, "quote")?;
    let kind = document_kind(&kind)?;
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        IssueDocumentRequest::default()
    } else {
        let request: IssueDocumentRequest =
            serde_json::from_slice(&body).map_err(|e| HandlerError::bad_request(format!("Invalid JSON: {}", e)))?;
        request
            .validate()
            .map_err(|e| HandlerError::validation(format!("Validation error: {}", e)))?;
        request
    };
    Ok(ok(service.issue_document(id, kind, request).await?))
}

/// `format` is json, csv or pdf (default pdf); `document` picks the kind
/// (default quote); `items` limits the printed lines.
pub async fn export_handler(
    State(service): State<QuoteState>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, HandlerError> {
    let id = object_id(&id, "quote")?;
    let raw_format = params.get("format").map(String::as_str).unwrap_or("pdf");
    let format = ExportFormat::parse(raw_format)
        .ok_or_else(|| HandlerError::bad_request(format!("Unknown export format '{}'", raw_format)))?;
    let kind = document_kind(params.get("document").map(String::as_str).unwrap_or("quote"))?;
    let selection = item_selection(params.get("items"))?;

    if format == ExportFormat::Json {
        let document = service.document(id, kind, selection).await?;
        return Ok(ok(document).into_response());
    }

    let file = service.export(id, kind, selection, format).await?;
    info!("[export_handler] Sending {} ({} bytes)", file.file_name, file.bytes.len());
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        file.bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_selection() {
        assert_eq!(item_selection(None).unwrap(), Vec::<usize>::new());
        assert_eq!(item_selection(Some(&"2, 0,".to_string())).unwrap(), vec![2, 0]);
        assert!(item_selection(Some(&"1,x".to_string())).is_err());
    }

    #[test]
    fn test_document_kind_rejects_unknown() {
        assert_eq!(document_kind("invoice").unwrap(), DocumentKind::Invoice);
        assert!(document_kind("memo").is_err());
    }
}
