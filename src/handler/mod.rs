pub mod category_handler;
pub mod company_info_handler;
pub mod multipart;
pub mod product_handler;
pub mod quote_handler;
pub mod report_handler;
pub mod special_order_handler;
