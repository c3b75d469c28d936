pub mod category_service;
pub mod company_info_service;
pub mod media;
pub mod product_service;
pub mod quote_service;
pub mod report_service;
pub mod special_order_service;
pub mod stock;
