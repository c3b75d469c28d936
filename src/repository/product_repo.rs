use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{Collection, Database, IndexModel};
use tracing::{debug, error, info, instrument, warn};

use crate::config::MongoConfig;
use crate::model::product::Product;
use crate::repository::mongo_client::{collect, escape_regex};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::util::time::now_rfc3339;

/// Listing filter. `category_ids` matches products filed under any of them.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_ids: Option<Vec<ObjectId>>,
    pub search: Option<String>,
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: Product) -> RepositoryResult<Product>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Product>;
    async fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Product>>;
    async fn replace(&self, product: Product) -> RepositoryResult<Product>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn list(&self, filter: &ProductFilter) -> RepositoryResult<Vec<Product>>;
    /// Add `delta` to the stock counter in one atomic update.
    async fn adjust_stock(&self, id: ObjectId, delta: i64) -> RepositoryResult<()>;
    /// Drop the category reference from every product filed under `category_ids`.
    async fn clear_category(&self, category_ids: &[ObjectId]) -> RepositoryResult<u64>;
    /// Products with `stock <= threshold`, lowest stock first.
    async fn low_stock(&self, threshold: i64) -> RepositoryResult<Vec<Product>>;
}

pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(database: &Database, config: &MongoConfig) -> Self {
        let collection = database.collection::<Product>(&config.collections.products);
        MongoProductRepository { collection }
    }

    /// Unique index on `code`, ignoring products without one.
    pub async fn ensure_indexes(&self) -> RepositoryResult<()> {
        let options = IndexOptions::builder()
            .unique(true)
            .partial_filter_expression(doc! { "code": { "$type": "string" } })
            .name("code_unique".to_string())
            .build();
        let index = IndexModel::builder()
            .keys(doc! { "code": 1 })
            .options(options)
            .build();
        self.collection.create_index(index, None).await?;
        debug!("Product indexes in place");
        Ok(())
    }
}

fn filter_document(filter: &ProductFilter) -> Document {
    let mut query = Document::new();
    if let Some(ids) = &filter.category_ids {
        query.insert("categoryId", doc! { "$in": ids.clone() });
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = escape_regex(search);
        query.insert(
            "$or",
            vec![
                doc! { "name": { "$regex": pattern.clone(), "$options": "i" } },
                doc! { "code": { "$regex": pattern, "$options": "i" } },
            ],
        );
    }
    query
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, product), fields(name = %product.name))]
    async fn create(&self, product: Product) -> RepositoryResult<Product> {
        let mut product = product;
        if product.id.is_none() {
            product.id = Some(ObjectId::new());
        }
        let now = now_rfc3339();
        product.created_at = Some(now.clone());
        product.updated_at = Some(now);

        self.collection.insert_one(&product, None).await.map_err(|e| {
            error!("Failed to create product: {}", e);
            RepositoryError::from(e)
        })?;
        info!(id = ?product.id, "Product created");
        Ok(product)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Product> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Product not found for ID: {}", id)))
    }

    #[instrument(skip(self))]
    async fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Product>> {
        Ok(self.collection.find_one(doc! { "code": code }, None).await?)
    }

    #[instrument(skip(self, product), fields(id = ?product.id))]
    async fn replace(&self, product: Product) -> RepositoryResult<Product> {
        let id = product
            .id
            .ok_or_else(|| RepositoryError::validation("Product has no id"))?;
        let mut updated = product;
        updated.updated_at = Some(now_rfc3339());

        let result = self
            .collection
            .replace_one(doc! { "_id": id }, &updated, None)
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("No product found to update for ID: {}", id)));
        }
        info!("Product {} updated", id);
        Ok(updated)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("No product found to delete for ID: {}", id)));
        }
        info!("Product {} deleted", id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &ProductFilter) -> RepositoryResult<Vec<Product>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self.collection.find(filter_document(filter), options).await?;
        collect(cursor, "product").await
    }

    #[instrument(skip(self), fields(id = %id, delta = delta))]
    async fn adjust_stock(&self, id: ObjectId, delta: i64) -> RepositoryResult<()> {
        let update = doc! {
            "$inc": { "stock": delta },
            "$set": { "updatedAt": now_rfc3339() },
        };
        let result = self.collection.update_one(doc! { "_id": id }, update, None).await?;
        if result.matched_count == 0 {
            warn!("Stock adjustment for missing product {}", id);
            return Err(RepositoryError::not_found(format!("Product not found for ID: {}", id)));
        }
        info!("Product {} stock adjusted by {}", id, delta);
        Ok(())
    }

    #[instrument(skip(self), fields(categories = category_ids.len()))]
    async fn clear_category(&self, category_ids: &[ObjectId]) -> RepositoryResult<u64> {
        if category_ids.is_empty() {
            return Ok(0);
        }
        let update = doc! { "$set": { "categoryId": null, "updatedAt": now_rfc3339() } };
        let result = self
            .collection
            .update_many(doc! { "categoryId": { "$in": category_ids.to_vec() } }, update, None)
            .await?;
        info!("Detached {} product(s) from removed categories", result.modified_count);
        Ok(result.modified_count)
    }

    #[instrument(skip(self))]
    async fn low_stock(&self, threshold: i64) -> RepositoryResult<Vec<Product>> {
        let options = FindOptions::builder().sort(doc! { "stock": 1, "name": 1 }).build();
        let cursor = self
            .collection
            .find(doc! { "stock": { "$lte": threshold } }, options)
            .await?;
        collect(cursor, "product").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_document_combines_category_and_search() {
        let id = ObjectId::new();
        let filter = ProductFilter {
            category_ids: Some(vec![id]),
            search: Some(" lamp. ".to_string()),
        };
        let query = filter_document(&filter);
        assert_eq!(query.get_document("categoryId").unwrap(), &doc! { "$in": [id] });
        let or = query.get_array("$or").unwrap();
        assert_eq!(
            or[0].as_document().unwrap(),
            &doc! { "name": { "$regex": "lamp\\.", "$options": "i" } }
        );
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(filter_document(&ProductFilter::default()).is_empty());
    }
}
