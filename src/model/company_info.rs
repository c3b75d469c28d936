use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::model::quote::CompanySnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub tax_id: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account: Option<String>,
    pub logo_url: Option<String>,
    #[serde(default)]
    pub partner_images: Vec<String>,
    #[serde(default)]
    pub certification_images: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl CompanyInfo {
    pub fn snapshot(&self) -> CompanySnapshot {
        CompanySnapshot {
            name: self.name.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            tax_id: self.tax_id.clone(),
            bank_name: self.bank_name.clone(),
            bank_account: self.bank_account.clone(),
            logo_url: self.logo_url.clone(),
        }
    }

    /// Every stored image URL, used when the record is deleted.
    pub fn image_urls(&self) -> Vec<String> {
        self.logo_url
            .iter()
            .chain(self.partner_images.iter())
            .chain(self.certification_images.iter())
            .cloned()
            .collect()
    }
}
