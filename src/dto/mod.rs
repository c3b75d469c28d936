pub mod category_dto;
pub mod company_info_dto;
pub mod file_dto;
pub mod product_dto;
pub mod quote_dto;
pub mod report_dto;
pub mod special_order_dto;
