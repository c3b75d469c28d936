use axum::{routing::get, Router};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{AppConfig, ConfigError, DocumentConfig, MinioConfig, MongoConfig};
use crate::handler::category_handler::CategoryState;
use crate::handler::company_info_handler::CompanyInfoState;
use crate::handler::product_handler::ProductState;
use crate::handler::quote_handler::QuoteState;
use crate::handler::report_handler::ReportState;
use crate::handler::special_order_handler::SpecialOrderState;
use crate::repository::category_repo::MongoCategoryRepository;
use crate::repository::company_info_repo::MongoCompanyInfoRepository;
use crate::repository::migration::migrate_quotes;
use crate::repository::mongo_client::connect;
use crate::repository::product_repo::MongoProductRepository;
use crate::repository::quote_repo::MongoQuoteRepository;
use crate::repository::repository_error::RepositoryError;
use crate::repository::special_order_repo::MongoSpecialOrderRepository;
use crate::router::category_router::category_router;
use crate::router::company_info_router::company_info_router;
use crate::router::product_router::product_router;
use crate::router::quote_router::quote_router;
use crate::router::report_router::report_router;
use crate::router::special_order_router::special_order_router;
use crate::service::category_service::CategoryServiceImpl;
use crate::service::company_info_service::CompanyInfoServiceImpl;
use crate::service::media::Storage;
use crate::service::product_service::ProductServiceImpl;
use crate::service::quote_service::QuoteServiceImpl;
use crate::service::report_service::ReportServiceImpl;
use crate::service::special_order_service::SpecialOrderServiceImpl;
use crate::util::minio::{MinioError, MinioService, ObjectStorage};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Storage error: {0}")]
    Storage(#[from] MinioError),
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Every service the HTTP layer needs, behind its trait.
#[derive(Clone)]
pub struct Services {
    pub quotes: QuoteState,
    pub products: ProductState,
    pub categories: CategoryState,
    pub special_orders: SpecialOrderState,
    pub company_info: CompanyInfoState,
    pub reports: ReportState,
}

/// The full API: `/health` plus every resource under `/api`.
pub fn build_router(services: Services) -> Router {
    let api = Router::new()
        .merge(quote_router(services.quotes))
        .merge(product_router(services.products))
        .merge(category_router(services.categories))
        .merge(special_order_router(services.special_orders))
        .merge(company_info_router(services.company_info))
        .merge(report_router(services.reports));

    Router::new()
        .nest("/api", api)
        .route("/health", get(|| async { "OK" }))
}

pub struct App {
    config: AppConfig,
    router: Router,
}

impl App {
    pub async fn new() -> Result<Self, AppError> {
        let config = AppConfig::from_env();
        let mongo_config = MongoConfig::from_env()?;
        let document_config = DocumentConfig::from_env()?;

        let database = connect(&mongo_config).await?;
        let migrated = migrate_quotes(&database, &mongo_config).await?;
        if migrated > 0 {
            info!("Migrated {} quote(s) to the current schema", migrated);
        }

        let storage: Storage = match MinioConfig::from_env()? {
            Some(minio_config) => {
                let service = MinioService::new(minio_config).await?;
                Some(Arc::new(service) as Arc<dyn ObjectStorage>)
            }
            None => {
                warn!("Object storage is not configured; image uploads will be rejected");
                None
            }
        };

        let quote_repo = Arc::new(MongoQuoteRepository::new(&database, &mongo_config));
        let product_repo = Arc::new(MongoProductRepository::new(&database, &mongo_config));
        product_repo.ensure_indexes().await?;
        let category_repo = Arc::new(MongoCategoryRepository::new(&database, &mongo_config));
        let order_repo = Arc::new(MongoSpecialOrderRepository::new(&database, &mongo_config));
        let company_repo = Arc::new(MongoCompanyInfoRepository::new(&database, &mongo_config));

        let threshold = document_config.low_stock_threshold;
        let services = Services {
            quotes: Arc::new(QuoteServiceImpl::new(
                quote_repo.clone(),
                product_repo.clone(),
                company_repo.clone(),
                document_config,
            )),
            products: Arc::new(ProductServiceImpl::new(
                product_repo.clone(),
                category_repo.clone(),
                storage.clone(),
            )),
            categories: Arc::new(CategoryServiceImpl::new(category_repo, product_repo.clone())),
            special_orders: Arc::new(SpecialOrderServiceImpl::new(order_repo.clone())),
            company_info: Arc::new(CompanyInfoServiceImpl::new(company_repo, storage)),
            reports: Arc::new(ReportServiceImpl::new(quote_repo, order_repo, product_repo, threshold)),
        };

        Ok(App {
            config,
            router: build_router(services),
        })
    }

    pub async fn start(self) -> Result<(), AppError> {
        let addr = self.config.socket_addr()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Server running at http://{}", addr);
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}
