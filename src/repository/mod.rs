pub mod category_repo;
pub mod company_info_repo;
pub mod migration;
pub mod mongo_client;
pub mod product_repo;
pub mod quote_repo;
pub mod repository_error;
pub mod special_order_repo;
