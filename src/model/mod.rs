pub mod category;
pub mod company_info;
pub mod product;
pub mod quote;
pub mod special_order;
