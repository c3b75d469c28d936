//! Printable documents built from a quote: the priced model shared by all
//! renderers, plus the CSV renderer. PDF lives in `util::pdf`.

use rust_decimal::prelude::*;
use serde::Serialize;

use crate::config::document_conf::CurrencyWords;
use crate::model::quote::{CompanySnapshot, DocumentKind, Quote, QuoteLineItem};
use crate::util::amount_words::amount_in_words;
use crate::util::error::ServiceError;

const DECIMAL_PLACES: u32 = 2;

/// Exact value of a stored amount. NaN, infinities and values beyond the
/// decimal range are rejected rather than read as zero.
pub fn to_decimal(value: f64) -> Result<Decimal, ServiceError> {
    Decimal::from_f64(value)
        .ok_or_else(|| ServiceError::InvalidInput(format!("Amount {} cannot be represented", value)))
}

pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Quantity times unit price, rounded to cents. Printed documents and the
/// report both sum these rounded amounts.
pub fn line_amount(item: &QuoteLineItem) -> Result<Decimal, ServiceError> {
    to_decimal(item.unit_price)?
        .checked_mul(Decimal::from(item.quantity))
        .map(round_money)
        .ok_or_else(|| {
            ServiceError::InvalidInput(format!(
                "Line '{}' is too large to price: {} x {}",
                item.name, item.quantity, item.unit_price
            ))
        })
}

pub fn add_amounts(total: Decimal, amount: Decimal) -> Result<Decimal, ServiceError> {
    total
        .checked_add(amount)
        .ok_or_else(|| ServiceError::InvalidInput("Total is too large to compute".to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            "pdf" => Some(ExportFormat::Pdf),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBlock {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLine {
    /// Position of the line in the quote.
    pub index: usize,
    pub name: String,
    pub variant: Option<String>,
    pub quantity: i64,
    pub unit_price: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDocument {
    pub kind: DocumentKind,
    pub title: String,
    pub number: Option<String>,
    pub date: Option<String>,
    pub due_date: Option<String>,
    pub customer: CustomerBlock,
    pub company: Option<CompanySnapshot>,
    pub note: Option<String>,
    pub lines: Vec<DocumentLine>,
    pub grand_total: f64,
    pub amount_in_words: String,
}

impl QuoteDocument {
    /// Download name, e.g. `INV-20260301-004.pdf`.
    pub fn file_name(&self, format: ExportFormat) -> String {
        let stem = self
            .number
            .clone()
            .unwrap_or_else(|| format!("{}-draft", self.kind.as_str()));
        format!("{}.{}", stem, format.extension())
    }
}

fn variant_of(item: &QuoteLineItem) -> Option<String> {
    let parts: Vec<&str> = [item.color.as_deref(), item.size.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" / "))
    }
}

/// Indices to print: every line when `selection` is empty, otherwise the
/// selected ones in quote order without repeats.
fn selected_indices(quote: &Quote, selection: &[usize]) -> Result<Vec<usize>, ServiceError> {
    if selection.is_empty() {
        return Ok((0..quote.items.len()).collect());
    }
    if let Some(bad) = selection.iter().find(|&&i| i >= quote.items.len()) {
        return Err(ServiceError::InvalidInput(format!(
            "Line {} does not exist; the quote has {} line(s)",
            bad,
            quote.items.len()
        )));
    }
    let mut indices = selection.to_vec();
    indices.sort_unstable();
    indices.dedup();
    Ok(indices)
}

/// Price the selected lines of `quote` and assemble the document of `kind`.
pub fn build_document(
    quote: &Quote,
    kind: DocumentKind,
    selection: &[usize],
    currency: &CurrencyWords,
) -> Result<QuoteDocument, ServiceError> {
    let indices = selected_indices(quote, selection)?;

    let mut grand_total = Decimal::ZERO;
    let mut lines = Vec::with_capacity(indices.len());
    for index in indices {
        let item = &quote.items[index];
        let unit_price = to_decimal(item.unit_price)?;
        let total = line_amount(item)?;
        grand_total = add_amounts(grand_total, total)?;
        lines.push(DocumentLine {
            index,
            name: item.name.clone(),
            variant: variant_of(item),
            quantity: item.quantity,
            unit_price: to_f64(unit_price),
            total: to_f64(total),
        });
    }

    let due_date = match kind {
        DocumentKind::Invoice => quote.documents.invoice_due_date.clone(),
        _ => None,
    };

    Ok(QuoteDocument {
        kind,
        title: kind.title().to_string(),
        number: quote.documents.number(kind).map(str::to_string),
        date: quote.documents.date(kind).map(str::to_string),
        due_date,
        customer: CustomerBlock {
            name: quote.customer_name.clone(),
            phone: quote.customer_phone.clone(),
            email: quote.customer_email.clone(),
            address: quote.customer_address.clone(),
        },
        company: quote.documents.company.clone(),
        note: quote.note.clone(),
        lines,
        grand_total: to_f64(grand_total),
        amount_in_words: amount_in_words(grand_total, currency),
    })
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_row(fields: &[String]) -> String {
    let mut row = fields.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(",");
    row.push_str("\r\n");
    row
}

/// One header row, one row per line and a closing total row.
pub fn render_csv(document: &QuoteDocument) -> String {
    let mut out = csv_row(
        &["#", "Item", "Variant", "Quantity", "Unit Price", "Total"].map(String::from),
    );
    for (position, line) in document.lines.iter().enumerate() {
        out.push_str(&csv_row(&[
            (position + 1).to_string(),
            line.name.clone(),
            line.variant.clone().unwrap_or_default(),
            line.quantity.to_string(),
            format!("{:.2}", line.unit_price),
            format!("{:.2}", line.total),
        ]));
    }
    out.push_str(&csv_row(&[
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        "Total".to_string(),
        format!("{:.2}", document.grand_total),
    ]));
    out
}
