use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson};
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};
use tracing::{error, info, instrument};

use crate::config::MongoConfig;
use crate::model::category::{Category, CategoryLevel};
use crate::repository::mongo_client::collect;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::util::time::now_rfc3339;

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: Category) -> RepositoryResult<Category>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Category>;
    /// Categories of `level` under `parent` (`None` for main categories),
    /// oldest first.
    async fn list_level(&self, level: CategoryLevel, parent: Option<ObjectId>) -> RepositoryResult<Vec<Category>>;
    async fn list_all(&self) -> RepositoryResult<Vec<Category>>;
    async fn rename(&self, id: ObjectId, name: &str) -> RepositoryResult<Category>;
    async fn delete_many(&self, ids: &[ObjectId]) -> RepositoryResult<u64>;
}

pub struct MongoCategoryRepository {
    collection: Collection<Category>,
}

impl MongoCategoryRepository {
    pub fn new(database: &Database, config: &MongoConfig) -> Self {
        let collection = database.collection::<Category>(&config.collections.categories);
        MongoCategoryRepository { collection }
    }
}

fn oldest_first() -> FindOptions {
    FindOptions::builder().sort(doc! { "createdAt": 1, "_id": 1 }).build()
}

#[async_trait]
impl CategoryRepository for MongoCategoryRepository {
    #[instrument(skip(self, category), fields(name = %category.name, level = category.level.as_str()))]
    async fn create(&self, category: Category) -> RepositoryResult<Category> {
        let mut category = category;
        category.id = Some(ObjectId::new());
        let now = now_rfc3339();
        category.created_at = Some(now.clone());
        category.updated_at = Some(now);

        self.collection.insert_one(&category, None).await.map_err(|e| {
            error!("Failed to create category: {}", e);
            RepositoryError::from(e)
        })?;
        info!(id = ?category.id, "Category created");
        Ok(category)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Category> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Category not found for ID: {}", id)))
    }

    #[instrument(skip(self))]
    async fn list_level(&self, level: CategoryLevel, parent: Option<ObjectId>) -> RepositoryResult<Vec<Category>> {
        let parent = parent.map(Bson::ObjectId).unwrap_or(Bson::Null);
        let filter = doc! { "level": level.as_str(), "parentId": parent };
        let cursor = self.collection.find(filter, oldest_first()).await?;
        collect(cursor, "category").await
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> RepositoryResult<Vec<Category>> {
        let cursor = self.collection.find(None, oldest_first()).await?;
        collect(cursor, "category").await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn rename(&self, id: ObjectId, name: &str) -> RepositoryResult<Category> {
        let update = doc! { "$set": { "name": name, "updatedAt": now_rfc3339() } };
        let result = self.collection.update_one(doc! { "_id": id }, update, None).await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("Category not found for ID: {}", id)));
        }
        info!("Category {} renamed to '{}'", id, name);
        self.get_by_id(id).await
    }

    #[instrument(skip(self), fields(count = ids.len()))]
    async fn delete_many(&self, ids: &[ObjectId]) -> RepositoryResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = self
            .collection
            .delete_many(doc! { "_id": { "$in": ids.to_vec() } }, None)
            .await?;
        info!("Deleted {} category record(s)", result.deleted_count);
        Ok(result.deleted_count)
    }
}
