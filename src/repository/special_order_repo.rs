use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};
use tracing::{error, info, instrument};

use crate::config::MongoConfig;
use crate::model::special_order::SpecialOrder;
use crate::repository::mongo_client::{collect, created_within};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::util::time::{now_rfc3339, DateRange};

#[async_trait]
pub trait SpecialOrderRepository: Send + Sync {
    async fn create(&self, order: SpecialOrder) -> RepositoryResult<SpecialOrder>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<SpecialOrder>;
    async fn replace(&self, order: SpecialOrder) -> RepositoryResult<SpecialOrder>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn list(&self, range: &DateRange) -> RepositoryResult<Vec<SpecialOrder>>;
}

pub struct MongoSpecialOrderRepository {
    collection: Collection<SpecialOrder>,
}

impl MongoSpecialOrderRepository {
    pub fn new(database: &Database, config: &MongoConfig) -> Self {
        let collection = database.collection::<SpecialOrder>(&config.collections.special_orders);
        MongoSpecialOrderRepository { collection }
    }
}

#[async_trait]
impl SpecialOrderRepository for MongoSpecialOrderRepository {
    #[instrument(skip(self, order), fields(customer = %order.customer_name))]
    async fn create(&self, order: SpecialOrder) -> RepositoryResult<SpecialOrder> {
        let mut order = order;
        order.id = Some(ObjectId::new());
        let now = now_rfc3339();
        order.created_at = Some(now.clone());
        order.updated_at = Some(now);

        self.collection.insert_one(&order, None).await.map_err(|e| {
            error!("Failed to create special order: {}", e);
            RepositoryError::from(e)
        })?;
        info!(id = ?order.id, "Special order created");
        Ok(order)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<SpecialOrder> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Special order not found for ID: {}", id)))
    }

    #[instrument(skip(self, order), fields(id = ?order.id))]
    async fn replace(&self, order: SpecialOrder) -> RepositoryResult<SpecialOrder> {
        let id = order
            .id
            .ok_or_else(|| RepositoryError::validation("Special order has no id"))?;
        let mut updated = order;
        updated.updated_at = Some(now_rfc3339());
        let result = self
            .collection
            .replace_one(doc! { "_id": id }, &updated, None)
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("No special order found to update for ID: {}", id)));
        }
        Ok(updated)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("No special order found to delete for ID: {}", id)));
        }
        info!("Special order {} deleted", id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, range: &DateRange) -> RepositoryResult<Vec<SpecialOrder>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self.collection.find(created_within(range), options).await?;
        collect(cursor, "special order").await
    }
}
