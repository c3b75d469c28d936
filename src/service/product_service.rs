use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::dto::file_dto::UploadedFile;
use crate::dto::product_dto::{ProductQuery, ProductRequest};
use crate::model::product::{normalize_options, Product};
use crate::repository::category_repo::CategoryRepository;
use crate::repository::product_repo::{ProductFilter, ProductRepository};
use crate::service::category_service::subtree_ids;
use crate::service::media::{dropped, remove_images, store_images, Storage};
use crate::util::error::ServiceError;

#[async_trait]
pub trait ProductService: Send + Sync {
    async fn create_product(&self, request: ProductRequest, images: Vec<UploadedFile>) -> Result<Product, ServiceError>;
    async fn get_product(&self, id: ObjectId) -> Result<Product, ServiceError>;
    async fn list_products(&self, query: ProductQuery) -> Result<Vec<Product>, ServiceError>;
    /// `request.images` lists the stored images to keep; new uploads are appended.
    async fn update_product(
        &self,
        id: ObjectId,
        request: ProductRequest,
        images: Vec<UploadedFile>,
    ) -> Result<Product, ServiceError>;
    async fn delete_product(&self, id: ObjectId) -> Result<(), ServiceError>;
}

pub struct ProductServiceImpl {
    pub product_repo: Arc<dyn ProductRepository>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub storage: Storage,
}

impl ProductServiceImpl {
    pub fn new(
        product_repo: Arc<dyn ProductRepository>,
        category_repo: Arc<dyn CategoryRepository>,
        storage: Storage,
    ) -> Self {
        ProductServiceImpl {
            product_repo,
            category_repo,
            storage,
        }
    }

    async fn category_ref(&self, raw: Option<&str>) -> Result<Option<ObjectId>, ServiceError> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let id = ObjectId::parse_str(raw)
            .map_err(|_| ServiceError::InvalidInput(format!("Invalid category id: {}", raw)))?;
        self.category_repo.get_by_id(id).await.map_err(|_| {
            ServiceError::InvalidInput(format!("Category {} does not exist", id))
        })?;
        Ok(Some(id))
    }

    async fn ensure_code_free(&self, code: Option<&str>, own_id: Option<ObjectId>) -> Result<(), ServiceError> {
        let Some(code) = code else {
            return Ok(());
        };
        match self.product_repo.find_by_code(code).await? {
            Some(existing) if existing.id != own_id => Err(ServiceError::Conflict(format!(
                "Product code '{}' is already used by another product",
                code
            ))),
            _ => Ok(()),
        }
    }
}

fn clean_code(code: Option<String>) -> Option<String> {
    code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())
}

#[async_trait]
impl ProductService for ProductServiceImpl {
    #[instrument(skip(self, request, images), fields(name = %request.name, images = images.len()))]
    async fn create_product(&self, request: ProductRequest, images: Vec<UploadedFile>) -> Result<Product, ServiceError> {
        let code = clean_code(request.code);
        self.ensure_code_free(code.as_deref(), None).await?;
        let category_id = self.category_ref(request.category_id.as_deref()).await?;

        let id = ObjectId::new();
        let urls = store_images(&self.storage, &format!("products/{}", id), &images).await?;

        let product = Product {
            id: Some(id),
            name: request.name.trim().to_string(),
            code,
            description: request.description,
            price: request.price,
            compare_at_price: request.compare_at_price,
            stock: request.stock.unwrap_or(0),
            colors: normalize_options(request.colors),
            sizes: normalize_options(request.sizes),
            images: urls.clone(),
            category_id,
            is_active: request.is_active.unwrap_or(true),
            created_at: None,
            updated_at: None,
        };
        match self.product_repo.create(product).await {
            Ok(created) => {
                info!(id = %id, "Product created");
                Ok(created)
            }
            Err(e) => {
                remove_images(&self.storage, &urls).await;
                Err(e.into())
            }
        }
    }

    async fn get_product(&self, id: ObjectId) -> Result<Product, ServiceError> {
        Ok(self.product_repo.get_by_id(id).await?)
    }

    #[instrument(skip(self))]
    async fn list_products(&self, query: ProductQuery) -> Result<Vec<Product>, ServiceError> {
        let category_ids = match query.category_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => {
                let root = ObjectId::parse_str(raw)
                    .map_err(|_| ServiceError::InvalidInput(format!("Invalid category id: {}", raw)))?;
                let all = self.category_repo.list_all().await?;
                Some(subtree_ids(root, &all))
            }
        };
        let filter = ProductFilter {
            category_ids,
            search: query.search,
        };
        Ok(self.product_repo.list(&filter).await?)
    }

    #[instrument(skip(self, request, images), fields(id = %id, images = images.len()))]
    async fn update_product(
        &self,
        id: ObjectId,
        request: ProductRequest,
        images: Vec<UploadedFile>,
    ) -> Result<Product, ServiceError> {
        let mut product = self.product_repo.get_by_id(id).await?;
        let code = clean_code(request.code);
        self.ensure_code_free(code.as_deref(), Some(id)).await?;
        let category_id = self.category_ref(request.category_id.as_deref()).await?;

        let kept: Vec<String> = product
            .images
            .iter()
            .filter(|url| request.images.contains(*url))
            .cloned()
            .collect();
        let removed = dropped(&product.images, &kept);
        let uploaded = store_images(&self.storage, &format!("products/{}", id), &images).await?;

        product.name = request.name.trim().to_string();
        product.code = code;
        product.description = request.description;
        product.price = request.price;
        product.compare_at_price = request.compare_at_price;
        if let Some(stock) = request.stock {
            product.stock = stock;
        }
        product.colors = normalize_options(request.colors);
        product.sizes = normalize_options(request.sizes);
        product.images = kept.into_iter().chain(uploaded.iter().cloned()).collect();
        product.category_id = category_id;
        if let Some(active) = request.is_active {
            product.is_active = active;
        }

        match self.product_repo.replace(product).await {
            Ok(saved) => {
                remove_images(&self.storage, &removed).await;
                Ok(saved)
            }
            Err(e) => {
                remove_images(&self.storage, &uploaded).await;
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_product(&self, id: ObjectId) -> Result<(), ServiceError> {
        let product = self.product_repo.get_by_id(id).await?;
        self.product_repo.delete(id).await?;
        remove_images(&self.storage, &product.images).await;
        info!("Product {} deleted", id);
        Ok(())
    }
}
