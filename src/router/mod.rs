pub mod category_router;
pub mod company_info_router;
pub mod product_router;
pub mod quote_router;
pub mod report_router;
pub mod special_order_router;
