use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::options::{FindOneOptions, FindOptions};
use mongodb::{Collection, Database};
use tracing::{error, info, instrument};

use crate::config::MongoConfig;
use crate::model::company_info::CompanyInfo;
use crate::repository::mongo_client::collect;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::util::time::now_rfc3339;

#[async_trait]
pub trait CompanyInfoRepository: Send + Sync {
    async fn create(&self, info: CompanyInfo) -> RepositoryResult<CompanyInfo>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<CompanyInfo>;
    async fn replace(&self, info: CompanyInfo) -> RepositoryResult<CompanyInfo>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    /// Oldest first.
    async fn list(&self) -> RepositoryResult<Vec<CompanyInfo>>;
    /// The oldest record, which documents are issued under.
    async fn first(&self) -> RepositoryResult<Option<CompanyInfo>>;
}

pub struct MongoCompanyInfoRepository {
    collection: Collection<CompanyInfo>,
}

impl MongoCompanyInfoRepository {
    pub fn new(database: &Database, config: &MongoConfig) -> Self {
        let collection = database.collection::<CompanyInfo>(&config.collections.company_info);
        MongoCompanyInfoRepository { collection }
    }
}

#[async_trait]
impl CompanyInfoRepository for MongoCompanyInfoRepository {
    #[instrument(skip(self, info), fields(name = %info.name))]
    async fn create(&self, info: CompanyInfo) -> RepositoryResult<CompanyInfo> {
        let mut record = info;
        if record.id.is_none() {
            record.id = Some(ObjectId::new());
        }
        let now = now_rfc3339();
        record.created_at = Some(now.clone());
        record.updated_at = Some(now);

        self.collection.insert_one(&record, None).await.map_err(|e| {
            error!("Failed to create company info: {}", e);
            RepositoryError::from(e)
        })?;
        info!(id = ?record.id, "Company info created");
        Ok(record)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<CompanyInfo> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Company info not found for ID: {}", id)))
    }

    #[instrument(skip(self, info), fields(id = ?info.id))]
    async fn replace(&self, info: CompanyInfo) -> RepositoryResult<CompanyInfo> {
        let id = info
            .id
            .ok_or_else(|| RepositoryError::validation("Company info has no id"))?;
        let mut updated = info;
        updated.updated_at = Some(now_rfc3339());
        let result = self
            .collection
            .replace_one(doc! { "_id": id }, &updated, None)
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("No company info found to update for ID: {}", id)));
        }
        Ok(updated)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("No company info found to delete for ID: {}", id)));
        }
        info!("Company info {} deleted", id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self) -> RepositoryResult<Vec<CompanyInfo>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": 1, "_id": 1 }).build();
        let cursor = self.collection.find(None, options).await?;
        collect(cursor, "company info").await
    }

    #[instrument(skip(self))]
    async fn first(&self) -> RepositoryResult<Option<CompanyInfo>> {
        let options = FindOneOptions::builder().sort(doc! { "createdAt": 1, "_id": 1 }).build();
        Ok(self.collection.find_one(None, options).await?)
    }
}
