//! One-time upgrade of stored quotes to `CURRENT_SCHEMA_VERSION`.
//!
//! Version 1 documents may carry line quantities under `qty` or `amount`,
//! line statuses under `status_type`, and no `quoteStatus`. After the
//! upgrade every read path can rely on the current field names.

use bson::{doc, Bson, Document};
use futures::stream::StreamExt;
use mongodb::Database;
use tracing::{error, info, instrument, warn};

use crate::config::MongoConfig;
use crate::model::quote::{aggregate_status, LineItemStatus, QuoteLineItem, QuoteStage, CURRENT_SCHEMA_VERSION};
use crate::repository::repository_error::RepositoryResult;

fn as_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        Bson::Double(v) if v.is_finite() => Some(v.round() as i64),
        Bson::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        Bson::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `"Sent Offer"`, `"sent-offer"` and `"sent_offer"` all read as `sent_offer`.
fn legacy_status(value: &Bson) -> Option<LineItemStatus> {
    let raw = value.as_str()?;
    let normalized: String = raw
        .trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect();
    LineItemStatus::parse(&normalized)
}

fn migrate_line(line: &Document) -> Document {
    let mut line = line.clone();

    let legacy_quantity = ["qty", "amount"]
        .iter()
        .find_map(|key| line.get(*key).and_then(as_i64));
    let quantity = line.get("quantity").and_then(as_i64).or(legacy_quantity).unwrap_or(1);
    line.insert("quantity", quantity);
    line.remove("qty");
    line.remove("amount");

    if !line.contains_key("unitPrice") {
        let price = line.get("price").and_then(as_f64).unwrap_or(0.0);
        line.insert("unitPrice", price);
        line.remove("price");
    }

    let status = line
        .get("status")
        .and_then(legacy_status)
        .or_else(|| line.get("status_type").and_then(legacy_status));
    line.remove("status_type");
    match status {
        Some(s) => line.insert("status", s.as_str()),
        None => line.insert("status", Bson::Null),
    };

    line
}

/// Upgraded copy of a stored quote, or `None` when it is already current.
pub fn migrate_quote_document(quote: &Document) -> Option<Document> {
    let version = quote.get("schemaVersion").and_then(as_i64).unwrap_or(1);
    if version >= i64::from(CURRENT_SCHEMA_VERSION) {
        return None;
    }
    let mut upgraded = quote.clone();

    let lines: Vec<Document> = quote
        .get_array("items")
        .map(|items| items.iter().filter_map(Bson::as_document).map(migrate_line).collect())
        .unwrap_or_default();

    let typed: Vec<QuoteLineItem> = lines
        .iter()
        .filter_map(|line| bson::from_document(line.clone()).ok())
        .collect();
    if typed.len() != lines.len() {
        warn!(id = ?quote.get("_id"), "Some quote lines could not be read after migration");
    }
    upgraded.insert("status", aggregate_status(&typed).as_str());
    upgraded.insert("items", lines);

    if !upgraded.contains_key("quoteStatus") {
        upgraded.insert("quoteStatus", QuoteStage::New.as_str());
    }
    upgraded.insert("schemaVersion", CURRENT_SCHEMA_VERSION);
    Some(upgraded)
}

/// Rewrite every quote stored below the current schema version.
/// Returns how many were upgraded.
#[instrument(skip(database, config))]
pub async fn migrate_quotes(database: &Database, config: &MongoConfig) -> RepositoryResult<u64> {
    let collection = database.collection::<Document>(&config.collections.quotes);
    let filter = doc! {
        "$or": [
            { "schemaVersion": { "$exists": false } },
            { "schemaVersion": { "$lt": CURRENT_SCHEMA_VERSION } },
        ]
    };
    let mut cursor = collection.find(filter, None).await?;
    let mut migrated = 0u64;
    while let Some(next) = cursor.next().await {
        let stored = match next {
            Ok(d) => d,
            Err(e) => {
                error!("Skipping unreadable quote during migration: {}", e);
                continue;
            }
        };
        let (Some(id), Some(upgraded)) = (stored.get("_id").cloned(), migrate_quote_document(&stored)) else {
            continue;
        };
        collection.replace_one(doc! { "_id": id }, upgraded, None).await?;
        migrated += 1;
    }
    if migrated > 0 {
        info!("Upgraded {} quote(s) to schema version {}", migrated, CURRENT_SCHEMA_VERSION);
    }
    Ok(migrated)
}
