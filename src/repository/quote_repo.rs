use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use chrono::{Duration, NaiveDate};
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};
use tracing::{debug, error, info, instrument};

use crate::config::MongoConfig;
use crate::model::quote::{DocumentKind, Quote, CURRENT_SCHEMA_VERSION};
use crate::repository::mongo_client::{collect, created_within};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::util::sequence::IssuedNumber;
use crate::util::time::{day_start, now_rfc3339, DateRange};

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn create(&self, quote: Quote) -> RepositoryResult<Quote>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Quote>;
    /// Overwrite the stored quote with the same id and bump `updatedAt`.
    async fn replace(&self, quote: Quote) -> RepositoryResult<Quote>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    /// Newest first, limited to quotes created within `range`.
    async fn list(&self, range: &DateRange) -> RepositoryResult<Vec<Quote>>;
    /// Numbers of `kind` that may belong to `date`: those carrying
    /// `day_prefix` plus any number on a quote created that day.
    async fn issued_numbers(
        &self,
        kind: DocumentKind,
        day_prefix: &str,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<IssuedNumber>>;
}

pub struct MongoQuoteRepository {
    collection: Collection<Quote>,
}

impl MongoQuoteRepository {
    pub fn new(database: &Database, config: &MongoConfig) -> Self {
        let collection = database.collection::<Quote>(&config.collections.quotes);
        MongoQuoteRepository { collection }
    }
}

fn id_of(quote: &Quote) -> RepositoryResult<ObjectId> {
    quote
        .id
        .ok_or_else(|| RepositoryError::validation("Quote has no id"))
}

#[async_trait]
impl QuoteRepository for MongoQuoteRepository {
    #[instrument(skip(self, quote), fields(customer = %quote.customer_name, items = quote.items.len()))]
    async fn create(&self, quote: Quote) -> RepositoryResult<Quote> {
        let mut new_quote = quote;
        new_quote.id = Some(ObjectId::new());
        new_quote.schema_version = CURRENT_SCHEMA_VERSION;
        let now = now_rfc3339();
        new_quote.created_at = Some(now.clone());
        new_quote.updated_at = Some(now);

        self.collection.insert_one(&new_quote, None).await.map_err(|e| {
            error!("Failed to create quote: {}", e);
            RepositoryError::from(e)
        })?;
        info!(id = ?new_quote.id, "Quote created");
        Ok(new_quote)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Quote> {
        match self.collection.find_one(doc! { "_id": id }, None).await? {
            Some(quote) => Ok(quote),
            None => {
                debug!("Quote not found for ID: {}", id);
                Err(RepositoryError::not_found(format!("Quote not found for ID: {}", id)))
            }
        }
    }

    #[instrument(skip(self, quote), fields(id = ?quote.id))]
    async fn replace(&self, quote: Quote) -> RepositoryResult<Quote> {
        let id = id_of(&quote)?;
        let mut updated = quote;
        updated.updated_at = Some(now_rfc3339());
        updated.schema_version = CURRENT_SCHEMA_VERSION;

        let result = self
            .collection
            .replace_one(doc! { "_id": id }, &updated, None)
            .await
            .map_err(|e| {
                error!("Failed to update quote {}: {}", id, e);
                RepositoryError::from(e)
            })?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("No quote found to update for ID: {}", id)));
        }
        info!("Quote {} updated", id);
        Ok(updated)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("No quote found to delete for ID: {}", id)));
        }
        info!("Quote {} deleted", id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, range: &DateRange) -> RepositoryResult<Vec<Quote>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self.collection.find(created_within(range), options).await?;
        let quotes = collect(cursor, "quote").await?;
        debug!("Fetched {} quotes", quotes.len());
        Ok(quotes)
    }

    #[instrument(skip(self))]
    async fn issued_numbers(
        &self,
        kind: DocumentKind,
        day_prefix: &str,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<IssuedNumber>> {
        let field = kind.number_field();
        // Prefixes are alphanumeric and dates are digits, so no escaping.
        let filter = doc! {
            "$or": [
                { field: { "$regex": format!("^{}-", day_prefix) } },
                {
                    field: { "$type": "string" },
                    "createdAt": { "$gte": day_start(date), "$lt": day_start(date + Duration::days(1)) },
                },
            ]
        };
        let options = FindOptions::builder()
            .projection(doc! { field: 1, "createdAt": 1 })
            .build();
        let raw = self.collection.clone_with_type::<Document>();
        let cursor = raw.find(filter, options).await?;
        let documents = collect(cursor, "quote number").await?;

        let key = field.trim_start_matches("documents.");
        Ok(documents
            .iter()
            .map(|d| IssuedNumber {
                number: d
                    .get_document("documents")
                    .ok()
                    .and_then(|meta| meta.get_str(key).ok())
                    .map(str::to_string),
                created_at: d.get_str("createdAt").ok().map(str::to_string),
            })
            .collect())
    }
}
