use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version written by the current code; older documents are upgraded at startup.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Pipeline stage of a single line item, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemStatus {
    #[default]
    Pending,
    SentOffer,
    CreateInvoice,
    Spent,
}

impl LineItemStatus {
    pub const ALL: [LineItemStatus; 4] = [
        LineItemStatus::Pending,
        LineItemStatus::SentOffer,
        LineItemStatus::CreateInvoice,
        LineItemStatus::Spent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LineItemStatus::Pending => "pending",
            LineItemStatus::SentOffer => "sent_offer",
            LineItemStatus::CreateInvoice => "create_invoice",
            LineItemStatus::Spent => "spent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value.trim())
    }

    /// Every stage up to and including `self`. Picking "spent" in the admin
    /// UI marks "sent_offer" and "create_invoice" as well.
    pub fn stages_through(self) -> Vec<LineItemStatus> {
        Self::ALL.into_iter().filter(|s| *s <= self).collect()
    }
}

impl fmt::Display for LineItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-controlled stage of the quote as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStage {
    #[default]
    New,
    Pending,
    InProgress,
    Completed,
    Rejected,
}

impl QuoteStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStage::New => "new",
            QuoteStage::Pending => "pending",
            QuoteStage::InProgress => "in_progress",
            QuoteStage::Completed => "completed",
            QuoteStage::Rejected => "rejected",
        }
    }
}

/// The three documents a quote can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Quote,
    Invoice,
    Receipt,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Quote => "quote",
            DocumentKind::Invoice => "invoice",
            DocumentKind::Receipt => "receipt",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "quote" => Some(DocumentKind::Quote),
            "invoice" => Some(DocumentKind::Invoice),
            "receipt" => Some(DocumentKind::Receipt),
            _ => None,
        }
    }

    /// Stored field path of this kind's number.
    pub fn number_field(&self) -> &'static str {
        match self {
            DocumentKind::Quote => "documents.quoteNumber",
            DocumentKind::Invoice => "documents.invoiceNumber",
            DocumentKind::Receipt => "documents.receiptNumber",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DocumentKind::Quote => "Quotation",
            DocumentKind::Invoice => "Invoice",
            DocumentKind::Receipt => "Expense Receipt",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issuing company's contact details, frozen when a document is generated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySnapshot {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentMeta {
    pub quote_number: Option<String>,
    pub quote_date: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<String>,
    pub invoice_due_date: Option<String>,
    pub receipt_number: Option<String>,
    pub receipt_date: Option<String>,
    pub company: Option<CompanySnapshot>,
}

impl DocumentMeta {
    pub fn number(&self, kind: DocumentKind) -> Option<&str> {
        match kind {
            DocumentKind::Quote => self.quote_number.as_deref(),
            DocumentKind::Invoice => self.invoice_number.as_deref(),
            DocumentKind::Receipt => self.receipt_number.as_deref(),
        }
    }

    pub fn date(&self, kind: DocumentKind) -> Option<&str> {
        match kind {
            DocumentKind::Quote => self.quote_date.as_deref(),
            DocumentKind::Invoice => self.invoice_date.as_deref(),
            DocumentKind::Receipt => self.receipt_date.as_deref(),
        }
    }

    pub fn set_issued(&mut self, kind: DocumentKind, number: String, date: String) {
        match kind {
            DocumentKind::Quote => {
                self.quote_number = Some(number);
                self.quote_date = Some(date);
            }
            DocumentKind::Invoice => {
                self.invoice_number = Some(number);
                self.invoice_date = Some(date);
            }
            DocumentKind::Receipt => {
                self.receipt_number = Some(number);
                self.receipt_date = Some(date);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLineItem {
    /// ObjectId hex, a product code, or a `product-<index>` placeholder.
    pub product_id: Option<String>,
    pub product_code: Option<String>,
    pub name: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub quantity: i64,
    pub unit_price: f64,
    /// `None` until an admin starts tracking the line.
    pub status: Option<LineItemStatus>,
}

impl QuoteLineItem {
    /// Placeholder ids written by the storefront when a line had no product.
    pub fn has_synthetic_product_id(&self) -> bool {
        self.product_id
            .as_deref()
            .and_then(|id| id.strip_prefix("product-"))
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
    pub note: Option<String>,
    #[serde(default)]
    pub items: Vec<QuoteLineItem>,
    /// Derived from `items`, never written from client input.
    #[serde(default)]
    pub status: LineItemStatus,
    #[serde(default)]
    pub quote_status: QuoteStage,
    #[serde(default)]
    pub documents: DocumentMeta,
    #[serde(default)]
    pub schema_version: i32,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Quote {
    pub fn recompute_status(&mut self) {
        self.status = aggregate_status(&self.items);
    }
}

/// Quote-level status derived from its lines:
/// spent if all lines are spent, create_invoice if all are at create_invoice
/// or later, sent_offer if any line carries a status, pending otherwise.
pub fn aggregate_status(items: &[QuoteLineItem]) -> LineItemStatus {
    if items.is_empty() {
        return LineItemStatus::Pending;
    }
    let at_least = |stage: LineItemStatus| items.iter().all(|item| item.status.is_some_and(|s| s >= stage));

    if at_least(LineItemStatus::Spent) {
        LineItemStatus::Spent
    } else if at_least(LineItemStatus::CreateInvoice) {
        LineItemStatus::CreateInvoice
    } else if items.iter().any(|item| item.status.is_some()) {
        LineItemStatus::SentOffer
    } else {
        LineItemStatus::Pending
    }
}
