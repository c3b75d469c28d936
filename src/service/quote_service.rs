use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{Duration, NaiveDate};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::DocumentConfig;
use crate::dto::quote_dto::{CreateQuoteRequest, IssueDocumentRequest, UpdateQuoteRequest};
use crate::model::quote::{DocumentKind, LineItemStatus, Quote, QuoteLineItem, QuoteStage, CURRENT_SCHEMA_VERSION};
use crate::repository::company_info_repo::CompanyInfoRepository;
use crate::repository::product_repo::ProductRepository;
use crate::repository::quote_repo::QuoteRepository;
use crate::service::stock::{apply_stock_changes, stock_changes, StockOutcome};
use crate::util::error::ServiceError;
use crate::util::export::{build_document, render_csv, ExportFormat, QuoteDocument};
use crate::util::pdf::render_pdf;
use crate::util::response::BulkOutcome;
use crate::util::sequence::{day_prefix, first_number, next_number};
use crate::util::time::{format_date, parse_date, today, DateRange};

/// A rendered export ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait QuoteService: Send + Sync {
    async fn create_quote(&self, request: CreateQuoteRequest) -> Result<Quote, ServiceError>;
    async fn get_quote(&self, id: ObjectId) -> Result<Quote, ServiceError>;
    async fn update_quote(&self, id: ObjectId, request: UpdateQuoteRequest) -> Result<Quote, ServiceError>;
    async fn delete_quote(&self, id: ObjectId) -> Result<(), ServiceError>;
    async fn list_quotes(&self, range: DateRange) -> Result<Vec<Quote>, ServiceError>;
    /// Ids that are malformed or missing count as failures.
    async fn bulk_delete(&self, ids: Vec<String>) -> Result<BulkOutcome, ServiceError>;

    async fn set_line_item_status(
        &self,
        id: ObjectId,
        index: usize,
        status: LineItemStatus,
    ) -> Result<Quote, ServiceError>;
    async fn set_line_items_status(
        &self,
        id: ObjectId,
        indices: Vec<usize>,
        status: LineItemStatus,
    ) -> Result<(Quote, BulkOutcome), ServiceError>;
    async fn set_quote_stage(&self, id: ObjectId, stage: QuoteStage) -> Result<Quote, ServiceError>;

    /// Preview of the number the next document of `kind` would get on `date`.
    async fn next_document_number(&self, kind: DocumentKind, date: NaiveDate) -> String;
    async fn issue_document(
        &self,
        id: ObjectId,
        kind: DocumentKind,
        request: IssueDocumentRequest,
    ) -> Result<Quote, ServiceError>;
    async fn document(&self, id: ObjectId, kind: DocumentKind, selection: Vec<usize>) -> Result<QuoteDocument, ServiceError>;
    async fn export(
        &self,
        id: ObjectId,
        kind: DocumentKind,
        selection: Vec<usize>,
        format: ExportFormat,
    ) -> Result<ExportFile, ServiceError>;
}

pub struct QuoteServiceImpl {
    pub quote_repo: Arc<dyn QuoteRepository>,
    pub product_repo: Arc<dyn ProductRepository>,
    pub company_repo: Arc<dyn CompanyInfoRepository>,
    pub config: DocumentConfig,
}

impl QuoteServiceImpl {
    pub fn new(
        quote_repo: Arc<dyn QuoteRepository>,
        product_repo: Arc<dyn ProductRepository>,
        company_repo: Arc<dyn CompanyInfoRepository>,
        config: DocumentConfig,
    ) -> Self {
        QuoteServiceImpl {
            quote_repo,
            product_repo,
            company_repo,
            config,
        }
    }

    async fn reconcile(&self, before: &[QuoteLineItem], after: &[QuoteLineItem]) -> StockOutcome {
        let changes = stock_changes(before, after);
        if changes.is_empty() {
            return StockOutcome::default();
        }
        let outcome = apply_stock_changes(self.product_repo.as_ref(), &changes).await;
        if outcome.failed > 0 || outcome.skipped > 0 {
            warn!(
                adjusted = outcome.adjusted,
                skipped = outcome.skipped,
                failed = outcome.failed,
                "Stock reconciliation incomplete"
            );
        }
        outcome
    }

    /// Persist a quote whose lines changed, keeping the aggregate in step.
    async fn save_lines(&self, mut quote: Quote, before: &[QuoteLineItem]) -> Result<Quote, ServiceError> {
        quote.recompute_status();
        let saved = self.quote_repo.replace(quote).await?;
        self.reconcile(before, &saved.items).await;
        Ok(saved)
    }

    fn parse_request_date(raw: Option<&str>, field: &str) -> Result<Option<NaiveDate>, ServiceError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(value) => parse_date(value).map(Some).ok_or_else(|| {
                ServiceError::InvalidInput(format!("{} must be formatted as YYYY-MM-DD, got '{}'", field, value))
            }),
        }
    }
}

#[async_trait]
impl QuoteService for QuoteServiceImpl {
    #[instrument(skip(self, request), fields(customer = %request.customer_name))]
    async fn create_quote(&self, request: CreateQuoteRequest) -> Result<Quote, ServiceError> {
        let mut quote = Quote {
            id: None,
            customer_name: request.customer_name.trim().to_string(),
            customer_phone: request.customer_phone.trim().to_string(),
            customer_email: request.customer_email,
            customer_address: request.customer_address,
            note: request.note,
            items: request.items.into_iter().map(QuoteLineItem::from).collect(),
            status: LineItemStatus::Pending,
            quote_status: request.quote_status.unwrap_or_default(),
            documents: Default::default(),
            schema_version: CURRENT_SCHEMA_VERSION,
            created_at: None,
            updated_at: None,
        };
        quote.recompute_status();

        let created = self.quote_repo.create(quote).await?;
        self.reconcile(&[], &created.items).await;
        info!(id = ?created.id, status = %created.status, "Quote registered");
        Ok(created)
    }

    async fn get_quote(&self, id: ObjectId) -> Result<Quote, ServiceError> {
        Ok(self.quote_repo.get_by_id(id).await?)
    }

    #[instrument(skip(self, request), fields(id = %id))]
    async fn update_quote(&self, id: ObjectId, request: UpdateQuoteRequest) -> Result<Quote, ServiceError> {
        let mut quote = self.quote_repo.get_by_id(id).await?;
        let before = quote.items.clone();

        if let Some(name) = request.customer_name {
            quote.customer_name = name.trim().to_string();
        }
        if let Some(phone) = request.customer_phone {
            quote.customer_phone = phone.trim().to_string();
        }
        if request.customer_email.is_some() {
            quote.customer_email = request.customer_email;
        }
        if request.customer_address.is_some() {
            quote.customer_address = request.customer_address;
        }
        if request.note.is_some() {
            quote.note = request.note;
        }
        if let Some(stage) = request.quote_status {
            quote.quote_status = stage;
        }
        if let Some(items) = request.items {
            quote.items = items.into_iter().map(QuoteLineItem::from).collect();
        }

        self.save_lines(quote, &before).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_quote(&self, id: ObjectId) -> Result<(), ServiceError> {
        self.quote_repo.delete(id).await?;
        info!("Quote {} deleted", id);
        Ok(())
    }

    async fn list_quotes(&self, range: DateRange) -> Result<Vec<Quote>, ServiceError> {
        Ok(self.quote_repo.list(&range).await?)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn bulk_delete(&self, ids: Vec<String>) -> Result<BulkOutcome, ServiceError> {
        let mut outcome = BulkOutcome::default();
        for raw in ids {
            let Ok(id) = ObjectId::parse_str(raw.trim()) else {
                warn!("Skipping malformed quote id '{}'", raw);
                outcome.failed += 1;
                continue;
            };
            match self.quote_repo.delete(id).await {
                Ok(()) => outcome.succeeded += 1,
                Err(e) => {
                    warn!("Could not delete quote {}: {}", id, e);
                    outcome.failed += 1;
                }
            }
        }
        info!(succeeded = outcome.succeeded, failed = outcome.failed, "Bulk quote delete finished");
        Ok(outcome)
    }

    #[instrument(skip(self), fields(id = %id, index = index, status = %status))]
    async fn set_line_item_status(
        &self,
        id: ObjectId,
        index: usize,
        status: LineItemStatus,
    ) -> Result<Quote, ServiceError> {
        let mut quote = self.quote_repo.get_by_id(id).await?;
        let before = quote.items.clone();
        let line_count = quote.items.len();
        let line = quote.items.get_mut(index).ok_or_else(|| {
            ServiceError::NotFound(format!("Quote {} has no line {} ({} line(s))", id, index, line_count))
        })?;
        line.status = Some(status);

        let saved = self.save_lines(quote, &before).await?;
        info!(aggregate = %saved.status, "Line status updated");
        Ok(saved)
    }

    #[instrument(skip(self, indices), fields(id = %id, count = indices.len(), status = %status))]
    async fn set_line_items_status(
        &self,
        id: ObjectId,
        indices: Vec<usize>,
        status: LineItemStatus,
    ) -> Result<(Quote, BulkOutcome), ServiceError> {
        let mut quote = self.quote_repo.get_by_id(id).await?;
        let before = quote.items.clone();
        let mut outcome = BulkOutcome::default();
        for index in indices {
            match quote.items.get_mut(index) {
                Some(line) => {
                    line.status = Some(status);
                    outcome.succeeded += 1;
                }
                None => {
                    warn!("Quote {} has no line {}", id, index);
                    outcome.failed += 1;
                }
            }
        }

        let saved = self.save_lines(quote, &before).await?;
        info!(aggregate = %saved.status, succeeded = outcome.succeeded, failed = outcome.failed, "Line statuses updated");
        Ok((saved, outcome))
    }

    #[instrument(skip(self), fields(id = %id, stage = stage.as_str()))]
    async fn set_quote_stage(&self, id: ObjectId, stage: QuoteStage) -> Result<Quote, ServiceError> {
        let mut quote = self.quote_repo.get_by_id(id).await?;
        quote.quote_status = stage;
        quote.recompute_status();
        Ok(self.quote_repo.replace(quote).await?)
    }

    #[instrument(skip(self))]
    async fn next_document_number(&self, kind: DocumentKind, date: NaiveDate) -> String {
        let prefix = day_prefix(self.config.prefix_for(kind), date);
        match self.quote_repo.issued_numbers(kind, &prefix, date).await {
            Ok(records) => next_number(self.config.prefix_for(kind), date, &records),
            Err(e) => {
                warn!("Could not scan issued {} numbers, starting the day over: {}", kind, e);
                first_number(&prefix)
            }
        }
    }

    #[instrument(skip(self, request), fields(id = %id, kind = %kind))]
    async fn issue_document(
        &self,
        id: ObjectId,
        kind: DocumentKind,
        request: IssueDocumentRequest,
    ) -> Result<Quote, ServiceError> {
        let mut quote = self.quote_repo.get_by_id(id).await?;
        let date = Self::parse_request_date(request.date.as_deref(), "date")?.unwrap_or_else(today);
        let due = Self::parse_request_date(request.due_date.as_deref(), "dueDate")?;
        if let Some(due) = due {
            if due < date {
                return Err(ServiceError::InvalidInput("dueDate cannot be before the issue date".to_string()));
            }
        }

        let number = match quote.documents.number(kind) {
            Some(existing) if !request.regenerate => existing.to_string(),
            _ => self.next_document_number(kind, date).await,
        };
        quote.documents.set_issued(kind, number.clone(), format_date(date));
        if kind == DocumentKind::Invoice {
            let due = due.unwrap_or(date + Duration::days(self.config.invoice_due_days));
            quote.documents.invoice_due_date = Some(format_date(due));
        }

        match self.company_repo.first().await {
            Ok(Some(company)) => quote.documents.company = Some(company.snapshot()),
            Ok(None) => warn!("No company info on record; document issued without issuer details"),
            Err(e) => warn!("Could not load company info for the document: {}", e),
        }

        let saved = self.quote_repo.replace(quote).await?;
        info!(number = %number, "Document issued");
        Ok(saved)
    }

    async fn document(&self, id: ObjectId, kind: DocumentKind, selection: Vec<usize>) -> Result<QuoteDocument, ServiceError> {
        let quote = self.quote_repo.get_by_id(id).await?;
        build_document(&quote, kind, &selection, &self.config.currency)
    }

    #[instrument(skip(self, selection), fields(id = %id, kind = %kind))]
    async fn export(
        &self,
        id: ObjectId,
        kind: DocumentKind,
        selection: Vec<usize>,
        format: ExportFormat,
    ) -> Result<ExportFile, ServiceError> {
        let document = self.document(id, kind, selection).await?;
        let bytes = match format {
            ExportFormat::Json => serde_json::to_vec_pretty(&document)
                .map_err(|e| ServiceError::InternalError(format!("Failed to serialize document: {}", e)))?,
            ExportFormat::Csv => render_csv(&document).into_bytes(),
            ExportFormat::Pdf => {
                let config = self.config.clone();
                let doc = document.clone();
                tokio::task::spawn_blocking(move || render_pdf(&doc, &config))
                    .await
                    .map_err(|e| ServiceError::InternalError(format!("PDF task failed: {}", e)))??
            }
        };
        info!(bytes = bytes.len(), "Export rendered");
        Ok(ExportFile {
            file_name: document.file_name(format),
            content_type: format.content_type(),
            bytes,
        })
    }
}
