use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;

use crate::dto::report_dto::{LowStockProduct, ReportSummary};
use crate::model::product::Product;
use crate::model::quote::{LineItemStatus, Quote};
use crate::model::special_order::SpecialOrder;
use crate::repository::product_repo::ProductRepository;
use crate::repository::quote_repo::QuoteRepository;
use crate::repository::special_order_repo::SpecialOrderRepository;
use crate::util::error::ServiceError;
use crate::util::export::{add_amounts, line_amount, to_f64};
use crate::util::time::{format_date, DateRange};

#[async_trait]
pub trait ReportService: Send + Sync {
    /// `low_stock_threshold` falls back to the configured default.
    async fn summary(&self, range: DateRange, low_stock_threshold: Option<i64>) -> Result<ReportSummary, ServiceError>;
}

pub struct ReportServiceImpl {
    pub quote_repo: Arc<dyn QuoteRepository>,
    pub order_repo: Arc<dyn SpecialOrderRepository>,
    pub product_repo: Arc<dyn ProductRepository>,
    pub default_threshold: i64,
}

impl ReportServiceImpl {
    pub fn new(
        quote_repo: Arc<dyn QuoteRepository>,
        order_repo: Arc<dyn SpecialOrderRepository>,
        product_repo: Arc<dyn ProductRepository>,
        default_threshold: i64,
    ) -> Self {
        ReportServiceImpl {
            quote_repo,
            order_repo,
            product_repo,
            default_threshold,
        }
    }
}

/// Stored amounts that cannot be priced are a data problem, not a bad request.
fn stored_amount_error(quote: &Quote, err: ServiceError) -> ServiceError {
    let id = quote.id.map(|id| id.to_hex()).unwrap_or_default();
    ServiceError::InternalError(format!("Quote {} cannot be totalled: {}", id, err))
}

/// Fold already-filtered records into the summary. Line amounts are rounded
/// to cents before summing, the same way printed documents total them.
pub fn summarize(
    quotes: &[Quote],
    orders: &[SpecialOrder],
    low_stock: &[Product],
    range: &DateRange,
    threshold: i64,
) -> Result<ReportSummary, ServiceError> {
    let mut quotes_by_status = BTreeMap::new();
    let mut quotes_by_stage = BTreeMap::new();
    let mut quoted = Decimal::ZERO;
    let mut spent = Decimal::ZERO;

    for quote in quotes {
        *quotes_by_status.entry(quote.status.as_str().to_string()).or_insert(0) += 1;
        *quotes_by_stage.entry(quote.quote_status.as_str().to_string()).or_insert(0) += 1;
        for item in &quote.items {
            let line = line_amount(item).map_err(|e| stored_amount_error(quote, e))?;
            quoted = add_amounts(quoted, line).map_err(|e| stored_amount_error(quote, e))?;
            if item.status == Some(LineItemStatus::Spent) {
                spent = add_amounts(spent, line).map_err(|e| stored_amount_error(quote, e))?;
            }
        }
    }

    let mut special_orders_by_status = BTreeMap::new();
    for order in orders {
        *special_orders_by_status.entry(order.status.as_str().to_string()).or_insert(0) += 1;
    }

    let mut low_stock_products: Vec<LowStockProduct> = low_stock
        .iter()
        .filter(|p| p.stock <= threshold)
        .map(|p| LowStockProduct {
            id: p.id,
            name: p.name.clone(),
            code: p.code.clone(),
            stock: p.stock,
        })
        .collect();
    low_stock_products.sort_by(|a, b| a.stock.cmp(&b.stock).then_with(|| a.name.cmp(&b.name)));

    Ok(ReportSummary {
        start_date: range.start.map(format_date),
        end_date: range.end.map(format_date),
        quote_count: quotes.len() as u64,
        quotes_by_status,
        quotes_by_stage,
        quoted_total: to_f64(quoted),
        spent_total: to_f64(spent),
        special_order_count: orders.len() as u64,
        special_orders_by_status,
        low_stock_threshold: threshold,
        low_stock_products,
    })
}

#[async_trait]
impl ReportService for ReportServiceImpl {
    #[instrument(skip(self))]
    async fn summary(&self, range: DateRange, low_stock_threshold: Option<i64>) -> Result<ReportSummary, ServiceError> {
        let threshold = low_stock_threshold.unwrap_or(self.default_threshold);
        let quotes = self.quote_repo.list(&range).await?;
        let orders = self.order_repo.list(&range).await?;
        let low_stock = self.product_repo.low_stock(threshold).await?;
        summarize(&quotes, &orders, &low_stock, &range, threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::quote::{QuoteLineItem, QuoteStage};
    use crate::model::special_order::SpecialOrderStatus;

    fn line(quantity: i64, unit_price: f64, status: Option<LineItemStatus>) -> QuoteLineItem {
        QuoteLineItem {
            product_id: None,
            product_code: None,
            name: "Item".to_string(),
            color: None,
            size: None,
            quantity,
            unit_price,
            status,
        }
    }

    fn quote(items: Vec<QuoteLineItem>, stage: QuoteStage) -> Quote {
        let mut quote = Quote {
            id: None,
            customer_name: "Customer".to_string(),
            customer_phone: "0550000000".to_string(),
            customer_email: None,
            customer_address: None,
            note: None,
            items,
            status: LineItemStatus::Pending,
            quote_status: stage,
            documents: Default::default(),
            schema_version: 2,
            created_at: None,
            updated_at: None,
        };
        quote.recompute_status();
        quote
    }

    fn product(name: &str, stock: i64) -> Product {
        Product {
            id: None,
            name: name.to_string(),
            code: None,
            description: None,
            price: 1.0,
            compare_at_price: None,
            stock,
            colors: vec![],
            sizes: vec![],
            images: vec![],
            category_id: None,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn order(status: SpecialOrderStatus) -> SpecialOrder {
        SpecialOrder {
            id: None,
            customer_name: "Customer".to_string(),
            customer_phone: "0550000000".to_string(),
            customer_email: None,
            product_name: "Custom".to_string(),
            description: None,
            quantity: 1,
            budget: None,
            status,
            admin_note: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_summary_totals_and_counts() {
        let quotes = vec![
            quote(
                vec![
                    line(2, 10.1, Some(LineItemStatus::Spent)),
                    line(1, 0.2, Some(LineItemStatus::SentOffer)),
                ],
                QuoteStage::InProgress,
            ),
            quote(vec![line(3, 5.0, None)], QuoteStage::New),
            quote(vec![line(1, 7.5, Some(LineItemStatus::Spent))], QuoteStage::Completed),
        ];
        let orders = vec![order(SpecialOrderStatus::New), order(SpecialOrderStatus::New), order(SpecialOrderStatus::Quoted)];
        let low = vec![product("B", 2), product("A", 0), product("C", 9)];
        let range = DateRange::parse(Some("2026-10-01"), None).unwrap();

        let summary = summarize(&quotes, &orders, &low, &range, 5).unwrap();

        assert_eq!(summary.quote_count, 3);
        assert_eq!(summary.quotes_by_status.get("sent_offer"), Some(&1));
        assert_eq!(summary.quotes_by_status.get("pending"), Some(&1));
        assert_eq!(summary.quotes_by_status.get("spent"), Some(&1));
        assert_eq!(summary.quotes_by_stage.get("in_progress"), Some(&1));
        assert_eq!(summary.quoted_total, 42.9);
        assert_eq!(summary.spent_total, 27.7);
        assert_eq!(summary.special_order_count, 3);
        assert_eq!(summary.special_orders_by_status.get("new"), Some(&2));
        assert_eq!(summary.start_date.as_deref(), Some("2026-10-01"));
        assert_eq!(summary.end_date, None);
        let names: Vec<&str> = summary.low_stock_products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[], &[], &[], &DateRange::default(), 5).unwrap();
        assert_eq!(summary.quote_count, 0);
        assert_eq!(summary.quoted_total, 0.0);
        assert!(summary.quotes_by_status.is_empty());
        assert_eq!(summary.low_stock_threshold, 5);
    }

    #[test]
    fn test_totals_round_each_line_like_documents() {
        // 3 x 0.335 prints as 1.01 per line; summing unrounded would give 2.01.
        let quotes = vec![quote(
            vec![
                line(3, 0.335, Some(LineItemStatus::Spent)),
                line(3, 0.335, Some(LineItemStatus::Spent)),
            ],
            QuoteStage::Completed,
        )];
        let summary = summarize(&quotes, &[], &[], &DateRange::default(), 5).unwrap();
        assert_eq!(summary.quoted_total, 2.02);
        assert_eq!(summary.spent_total, 2.02);
    }

    #[test]
    fn test_oversized_stored_line_is_an_error() {
        let quotes = vec![quote(vec![line(10_000_000_000, 1e20, None)], QuoteStage::New)];
        let err = summarize(&quotes, &[], &[], &DateRange::default(), 5).unwrap_err();
        assert!(matches!(err, ServiceError::InternalError(_)));
    }
}
