use serde::{Deserialize, Serialize};
use validator::Validate;

/// JSON part of the company info multipart form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfoRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(max = 30))]
    pub phone: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    pub address: Option<String>,

    #[validate(url)]
    pub website: Option<String>,

    pub tax_id: Option<String>,

    pub bank_name: Option<String>,

    pub bank_account: Option<String>,

    /// On update: `false` drops the stored logo when no new one is uploaded.
    pub keep_logo: Option<bool>,

    /// On update: partner image URLs to keep.
    #[serde(default)]
    pub partner_images: Vec<String>,

    /// On update: certification image URLs to keep.
    #[serde(default)]
    pub certification_images: Vec<String>,
}
