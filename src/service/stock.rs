//! Stock reconciliation for quote lines that reach (or leave) `spent`.

use bson::oid::ObjectId;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::model::product::Product;
use crate::model::quote::{LineItemStatus, QuoteLineItem};
use crate::repository::product_repo::ProductRepository;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

/// A pending stock movement for one line.
#[derive(Debug, Clone, PartialEq)]
pub struct StockChange<'a> {
    pub line: &'a QuoteLineItem,
    pub delta: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockOutcome {
    pub adjusted: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Units a line has taken out of stock: its quantity once it is spent, for
/// lines that point at a real product.
fn consumed(line: &QuoteLineItem) -> Option<i64> {
    let spent = line.status == Some(LineItemStatus::Spent);
    if !spent || line.quantity <= 0 || line.has_synthetic_product_id() {
        return None;
    }
    Some(line.quantity)
}

fn same_product(a: &QuoteLineItem, b: &QuoteLineItem) -> bool {
    a.product_id == b.product_id && a.product_code == b.product_code
}

/// Movements needed to go from `before` to `after`, compared line by line.
/// A line entering `spent` takes its quantity out; a line leaving it (or
/// changing product or quantity while spent) puts the old quantity back.
pub fn stock_changes<'a>(before: &'a [QuoteLineItem], after: &'a [QuoteLineItem]) -> Vec<StockChange<'a>> {
    let mut changes = Vec::new();
    for index in 0..before.len().max(after.len()) {
        let old = before.get(index).and_then(|l| consumed(l).map(|q| (l, q)));
        let new = after.get(index).and_then(|l| consumed(l).map(|q| (l, q)));
        match (old, new) {
            (Some((o, oq)), Some((n, nq))) if same_product(o, n) && oq == nq => {}
            (old, new) => {
                if let Some((line, quantity)) = old {
                    changes.push(StockChange { line, delta: quantity });
                }
                if let Some((line, quantity)) = new {
                    changes.push(StockChange { line, delta: -quantity });
                }
            }
        }
    }
    changes
}

/// Find the product a line refers to: its `productId` as an ObjectId first,
/// then its `productCode`, then its `productId` read as a code.
pub async fn resolve_product(
    products: &dyn ProductRepository,
    line: &QuoteLineItem,
) -> RepositoryResult<Option<Product>> {
    if let Some(id) = line.product_id.as_deref().and_then(|raw| ObjectId::parse_str(raw).ok()) {
        match products.get_by_id(id).await {
            Ok(product) => return Ok(Some(product)),
            Err(RepositoryError::NotFound(_)) => debug!("No product with id {}, trying codes", id),
            Err(e) => return Err(e),
        }
    }
    for code in [line.product_code.as_deref(), line.product_id.as_deref()].into_iter().flatten() {
        if let Some(product) = products.find_by_code(code).await? {
            return Ok(Some(product));
        }
    }
    Ok(None)
}

/// Apply movements one by one. Failures are logged and counted; nothing is
/// rolled back and the caller's write is never failed by this.
pub async fn apply_stock_changes(products: &dyn ProductRepository, changes: &[StockChange<'_>]) -> StockOutcome {
    let mut outcome = StockOutcome::default();
    for change in changes {
        let product = match resolve_product(products, change.line).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                warn!(line = %change.line.name, "No product matches quote line, stock left unchanged");
                outcome.skipped += 1;
                continue;
            }
            Err(e) => {
                warn!(line = %change.line.name, "Product lookup failed: {}", e);
                outcome.failed += 1;
                continue;
            }
        };
        let Some(id) = product.id else {
            outcome.skipped += 1;
            continue;
        };
        match products.adjust_stock(id, change.delta).await {
            Ok(()) => {
                info!(product = %id, delta = change.delta, "Stock reconciled for quote line '{}'", change.line.name);
                outcome.adjusted += 1;
            }
            Err(e) => {
                warn!(product = %id, "Stock adjustment failed: {}", e);
                outcome.failed += 1;
            }
        }
    }
    outcome
}
