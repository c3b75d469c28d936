pub mod amount_words;
pub mod error;
pub mod export;
pub mod extract;
pub mod logger;
pub mod minio;
pub mod pdf;
pub mod response;
pub mod sequence;
pub mod time;
