#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use bson::oid::ObjectId;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use storefront_admin::app::app::{build_router, Services};
use storefront_admin::config::DocumentConfig;
use storefront_admin::model::category::{Category, CategoryLevel};
use storefront_admin::model::company_info::CompanyInfo;
use storefront_admin::model::product::Product;
use storefront_admin::model::quote::{DocumentKind, Quote, CURRENT_SCHEMA_VERSION};
use storefront_admin::model::special_order::SpecialOrder;
use storefront_admin::repository::category_repo::CategoryRepository;
use storefront_admin::repository::company_info_repo::CompanyInfoRepository;
use storefront_admin::repository::product_repo::{ProductFilter, ProductRepository};
use storefront_admin::repository::quote_repo::QuoteRepository;
use storefront_admin::repository::repository_error::{RepositoryError, RepositoryResult};
use storefront_admin::repository::special_order_repo::SpecialOrderRepository;
use storefront_admin::service::category_service::CategoryServiceImpl;
use storefront_admin::service::company_info_service::CompanyInfoServiceImpl;
use storefront_admin::service::product_service::ProductServiceImpl;
use storefront_admin::service::quote_service::QuoteServiceImpl;
use storefront_admin::service::report_service::ReportServiceImpl;
use storefront_admin::service::special_order_service::SpecialOrderServiceImpl;
use storefront_admin::util::minio::{MinioError, ObjectStorage};
use storefront_admin::util::sequence::IssuedNumber;
use storefront_admin::util::time::{date_of, now_rfc3339, DateRange};

fn stamp<T>(slot: &mut Option<T>, value: T) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

#[derive(Default)]
pub struct InMemoryQuoteRepository {
    pub quotes: Mutex<Vec<Quote>>,
    /// Makes `issued_numbers` fail as if the database were unreachable.
    pub fail_number_lookup: AtomicBool,
}

impl InMemoryQuoteRepository {
    /// Store a quote as given, keeping its timestamps.
    pub fn seed(&self, mut quote: Quote) -> Quote {
        stamp(&mut quote.id, ObjectId::new());
        quote.schema_version = CURRENT_SCHEMA_VERSION;
        self.quotes.lock().unwrap().push(quote.clone());
        quote
    }
}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn create(&self, mut quote: Quote) -> RepositoryResult<Quote> {
        quote.id = Some(ObjectId::new());
        quote.schema_version = CURRENT_SCHEMA_VERSION;
        let now = now_rfc3339();
        quote.created_at = Some(now.clone());
        quote.updated_at = Some(now);
        self.quotes.lock().unwrap().push(quote.clone());
        Ok(quote)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Quote> {
        self.quotes
            .lock()
            .unwrap()
            .iter()
            .find(|q| q.id == Some(id))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Quote not found for ID: {}", id)))
    }

    async fn replace(&self, mut quote: Quote) -> RepositoryResult<Quote> {
        let mut quotes = self.quotes.lock().unwrap();
        let slot = quotes
            .iter_mut()
            .find(|q| q.id == quote.id)
            .ok_or_else(|| RepositoryError::not_found("No quote found to update"))?;
        quote.schema_version = CURRENT_SCHEMA_VERSION;
        quote.updated_at = Some(now_rfc3339());
        *slot = quote.clone();
        Ok(quote)
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut quotes = self.quotes.lock().unwrap();
        let before = quotes.len();
        quotes.retain(|q| q.id != Some(id));
        if quotes.len() == before {
            return Err(RepositoryError::not_found(format!("No quote found to delete for ID: {}", id)));
        }
        Ok(())
    }

    async fn list(&self, range: &DateRange) -> RepositoryResult<Vec<Quote>> {
        let mut found: Vec<Quote> = self
            .quotes
            .lock()
            .unwrap()
            .iter()
            .filter(|q| range.contains(q.created_at.as_deref()))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn issued_numbers(
        &self,
        kind: DocumentKind,
        day_prefix: &str,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<IssuedNumber>> {
        if self.fail_number_lookup.load(Ordering::SeqCst) {
            return Err(RepositoryError::ConnectionError("number lookup unavailable".to_string()));
        }
        let marker = format!("{}-", day_prefix);
        Ok(self
            .quotes
            .lock()
            .unwrap()
            .iter()
            .filter_map(|q| {
                let number = q.documents.number(kind)?;
                let same_day = q.created_at.as_deref().and_then(date_of) == Some(date);
                (number.starts_with(&marker) || same_day).then(|| IssuedNumber {
                    number: Some(number.to_string()),
                    created_at: q.created_at.clone(),
                })
            })
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    pub products: Mutex<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn stock_of(&self, id: ObjectId) -> i64 {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == Some(id))
            .map(|p| p.stock)
            .unwrap_or_default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, mut product: Product) -> RepositoryResult<Product> {
        stamp(&mut product.id, ObjectId::new());
        let now = now_rfc3339();
        product.created_at = Some(now.clone());
        product.updated_at = Some(now);
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Product> {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == Some(id))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Product not found for ID: {}", id)))
    }

    async fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Product>> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.code.as_deref() == Some(code))
            .cloned())
    }

    async fn replace(&self, mut product: Product) -> RepositoryResult<Product> {
        let mut products = self.products.lock().unwrap();
        let slot = products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| RepositoryError::not_found("No product found to update"))?;
        product.updated_at = Some(now_rfc3339());
        *slot = product.clone();
        Ok(product)
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| p.id != Some(id));
        if products.len() == before {
            return Err(RepositoryError::not_found(format!("No product found to delete for ID: {}", id)));
        }
        Ok(())
    }

    async fn list(&self, filter: &ProductFilter) -> RepositoryResult<Vec<Product>> {
        let needle = filter.search.as_deref().map(str::to_lowercase);
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| match &filter.category_ids {
                Some(ids) => p.category_id.is_some_and(|c| ids.contains(&c)),
                None => true,
            })
            .filter(|p| match &needle {
                Some(n) => {
                    p.name.to_lowercase().contains(n)
                        || p.code.as_deref().is_some_and(|c| c.to_lowercase().contains(n))
                }
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn adjust_stock(&self, id: ObjectId, delta: i64) -> RepositoryResult<()> {
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found(format!("Product not found for ID: {}", id)))?;
        product.stock += delta;
        Ok(())
    }

    async fn clear_category(&self, category_ids: &[ObjectId]) -> RepositoryResult<u64> {
        let mut cleared = 0;
        for product in self.products.lock().unwrap().iter_mut() {
            if product.category_id.is_some_and(|c| category_ids.contains(&c)) {
                product.category_id = None;
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    async fn low_stock(&self, threshold: i64) -> RepositoryResult<Vec<Product>> {
        let mut found: Vec<Product> = self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.stock <= threshold)
            .cloned()
            .collect();
        found.sort_by_key(|p| p.stock);
        Ok(found)
    }
}

#[derive(Default)]
pub struct InMemoryCategoryRepository {
    pub categories: Mutex<Vec<Category>>,
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn create(&self, mut category: Category) -> RepositoryResult<Category> {
        category.id = Some(ObjectId::new());
        let now = now_rfc3339();
        category.created_at = Some(now.clone());
        category.updated_at = Some(now);
        self.categories.lock().unwrap().push(category.clone());
        Ok(category)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Category> {
        self.categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == Some(id))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Category not found for ID: {}", id)))
    }

    async fn list_level(&self, level: CategoryLevel, parent: Option<ObjectId>) -> RepositoryResult<Vec<Category>> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.level == level && c.parent_id == parent)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> RepositoryResult<Vec<Category>> {
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn rename(&self, id: ObjectId, name: &str) -> RepositoryResult<Category> {
        let mut categories = self.categories.lock().unwrap();
        let category = categories
            .iter_mut()
            .find(|c| c.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found(format!("No category found to rename for ID: {}", id)))?;
        category.name = name.to_string();
        category.updated_at = Some(now_rfc3339());
        Ok(category.clone())
    }

    async fn delete_many(&self, ids: &[ObjectId]) -> RepositoryResult<u64> {
        let mut categories = self.categories.lock().unwrap();
        let before = categories.len();
        categories.retain(|c| !c.id.is_some_and(|id| ids.contains(&id)));
        Ok((before - categories.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemorySpecialOrderRepository {
    pub orders: Mutex<Vec<SpecialOrder>>,
}

impl InMemorySpecialOrderRepository {
    pub fn seed(&self, mut order: SpecialOrder) -> SpecialOrder {
        stamp(&mut order.id, ObjectId::new());
        self.orders.lock().unwrap().push(order.clone());
        order
    }
}

#[async_trait]
impl SpecialOrderRepository for InMemorySpecialOrderRepository {
    async fn create(&self, mut order: SpecialOrder) -> RepositoryResult<SpecialOrder> {
        order.id = Some(ObjectId::new());
        let now = now_rfc3339();
        order.created_at = Some(now.clone());
        order.updated_at = Some(now);
        self.orders.lock().unwrap().push(order.clone());
        Ok(order)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<SpecialOrder> {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == Some(id))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Special order not found for ID: {}", id)))
    }

    async fn replace(&self, mut order: SpecialOrder) -> RepositoryResult<SpecialOrder> {
        let mut orders = self.orders.lock().unwrap();
        let slot = orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or_else(|| RepositoryError::not_found("No special order found to update"))?;
        order.updated_at = Some(now_rfc3339());
        *slot = order.clone();
        Ok(order)
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut orders = self.orders.lock().unwrap();
        let before = orders.len();
        orders.retain(|o| o.id != Some(id));
        if orders.len() == before {
            return Err(RepositoryError::not_found(format!("No special order found to delete for ID: {}", id)));
        }
        Ok(())
    }

    async fn list(&self, range: &DateRange) -> RepositoryResult<Vec<SpecialOrder>> {
        let mut found: Vec<SpecialOrder> = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| range.contains(o.created_at.as_deref()))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}

#[derive(Default)]
pub struct InMemoryCompanyInfoRepository {
    pub records: Mutex<Vec<CompanyInfo>>,
}

#[async_trait]
impl CompanyInfoRepository for InMemoryCompanyInfoRepository {
    async fn create(&self, mut info: CompanyInfo) -> RepositoryResult<CompanyInfo> {
        stamp(&mut info.id, ObjectId::new());
        let now = now_rfc3339();
        info.created_at = Some(now.clone());
        info.updated_at = Some(now);
        self.records.lock().unwrap().push(info.clone());
        Ok(info)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<CompanyInfo> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == Some(id))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Company info not found for ID: {}", id)))
    }

    async fn replace(&self, mut info: CompanyInfo) -> RepositoryResult<CompanyInfo> {
        let mut records = self.records.lock().unwrap();
        let slot = records
            .iter_mut()
            .find(|r| r.id == info.id)
            .ok_or_else(|| RepositoryError::not_found("No company info found to update"))?;
        info.updated_at = Some(now_rfc3339());
        *slot = info.clone();
        Ok(info)
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != Some(id));
        if records.len() == before {
            return Err(RepositoryError::not_found(format!("No company info found to delete for ID: {}", id)));
        }
        Ok(())
    }

    async fn list(&self) -> RepositoryResult<Vec<CompanyInfo>> {
        Ok(self.records.lock().unwrap().clone())
    }

    async fn first(&self) -> RepositoryResult<Option<CompanyInfo>> {
        Ok(self.records.lock().unwrap().first().cloned())
    }
}

pub const STORAGE_BASE: &str = "http://files.test/media";

#[derive(Default)]
pub struct InMemoryStorage {
    pub objects: Mutex<HashMap<String, (Vec<u8>, Option<String>)>>,
}

impl InMemoryStorage {
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn put_object(&self, object_name: &str, data: Vec<u8>, content_type: Option<&str>) -> Result<(), MinioError> {
        self.objects
            .lock()
            .unwrap()
            .insert(object_name.to_string(), (data, content_type.map(str::to_string)));
        Ok(())
    }

    async fn remove_object(&self, object_name: &str) -> Result<(), MinioError> {
        self.objects.lock().unwrap().remove(object_name);
        Ok(())
    }

    fn public_url(&self, object_name: &str) -> String {
        format!("{}/{}", STORAGE_BASE, object_name)
    }
}

/// The router wired to in-memory repositories, with handles to inspect them.
pub struct TestApp {
    pub router: Router,
    pub quotes: Arc<InMemoryQuoteRepository>,
    pub products: Arc<InMemoryProductRepository>,
    pub categories: Arc<InMemoryCategoryRepository>,
    pub special_orders: Arc<InMemorySpecialOrderRepository>,
    pub company_info: Arc<InMemoryCompanyInfoRepository>,
    pub storage: Arc<InMemoryStorage>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_storage(true)
    }

    pub fn with_storage(enabled: bool) -> Self {
        let quotes = Arc::new(InMemoryQuoteRepository::default());
        let products = Arc::new(InMemoryProductRepository::default());
        let categories = Arc::new(InMemoryCategoryRepository::default());
        let special_orders = Arc::new(InMemorySpecialOrderRepository::default());
        let company_info = Arc::new(InMemoryCompanyInfoRepository::default());
        let storage = Arc::new(InMemoryStorage::default());
        let store: Option<Arc<dyn ObjectStorage>> = enabled.then(|| storage.clone() as Arc<dyn ObjectStorage>);
        let config = DocumentConfig::default();
        let threshold = config.low_stock_threshold;

        let services = Services {
            quotes: Arc::new(QuoteServiceImpl::new(
                quotes.clone(),
                products.clone(),
                company_info.clone(),
                config,
            )),
            products: Arc::new(ProductServiceImpl::new(products.clone(), categories.clone(), store.clone())),
            categories: Arc::new(CategoryServiceImpl::new(categories.clone(), products.clone())),
            special_orders: Arc::new(SpecialOrderServiceImpl::new(special_orders.clone())),
            company_info: Arc::new(CompanyInfoServiceImpl::new(company_info.clone(), store)),
            reports: Arc::new(ReportServiceImpl::new(
                quotes.clone(),
                special_orders.clone(),
                products.clone(),
                threshold,
            )),
        };

        TestApp {
            router: build_router(services),
            quotes,
            products,
            categories,
            special_orders,
            company_info,
            storage,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let (status, _, bytes) = self.raw(req).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    /// Send a prepared request; returns status, headers and body bytes.
    pub async fn raw(&self, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
        (status, headers, bytes)
    }

    pub async fn multipart(&self, method: Method, uri: &str, form: MultipartBody) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", form.content_type())
            .body(Body::from(form.finish()))
            .unwrap();
        let (status, _, bytes) = self.raw(req).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}

const BOUNDARY: &str = "storefront-test-boundary";

/// Minimal multipart/form-data encoder for tests.
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn json(value: &Value) -> Self {
        let mut form = MultipartBody::default();
        form.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"json\"\r\nContent-Type: application/json\r\n\r\n{}\r\n",
                BOUNDARY, value
            )
            .as_bytes(),
        );
        form
    }

    pub fn file(mut self, field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, field, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.body
    }
}

/// `_id` of a JSON record, whether serialized as `{"$oid": ..}` or a plain string.
pub fn id_of(value: &Value) -> String {
    let id = &value["_id"];
    id["$oid"]
        .as_str()
        .or_else(|| id.as_str())
        .map(str::to_string)
        .unwrap_or_default()
}
