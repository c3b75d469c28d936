use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::dto::company_info_dto::CompanyInfoRequest;
use crate::dto::file_dto::{MultipartForm, UploadedFile};
use crate::model::company_info::CompanyInfo;
use crate::repository::company_info_repo::CompanyInfoRepository;
use crate::service::media::{dropped, remove_images, store_images, Storage};
use crate::util::error::ServiceError;

/// Files uploaded alongside a company info form.
#[derive(Debug, Clone, Default)]
pub struct CompanyImages {
    pub logo: Option<UploadedFile>,
    pub partners: Vec<UploadedFile>,
    pub certifications: Vec<UploadedFile>,
}

impl CompanyImages {
    /// `logo`, then every field starting with `partner` or `certification`.
    pub fn from_form(form: &MultipartForm) -> Self {
        CompanyImages {
            logo: form.files.iter().find(|f| f.field == "logo").cloned(),
            partners: form.files_with_prefix("partner"),
            certifications: form.files_with_prefix("certification"),
        }
    }

    fn count(&self) -> usize {
        usize::from(self.logo.is_some()) + self.partners.len() + self.certifications.len()
    }
}

#[async_trait]
pub trait CompanyInfoService: Send + Sync {
    async fn create_info(&self, request: CompanyInfoRequest, images: CompanyImages) -> Result<CompanyInfo, ServiceError>;
    async fn get_info(&self, id: ObjectId) -> Result<CompanyInfo, ServiceError>;
    async fn list_info(&self) -> Result<Vec<CompanyInfo>, ServiceError>;
    /// The record used on issued documents, if any exists.
    async fn current(&self) -> Result<Option<CompanyInfo>, ServiceError>;
    async fn update_info(
        &self,
        id: ObjectId,
        request: CompanyInfoRequest,
        images: CompanyImages,
    ) -> Result<CompanyInfo, ServiceError>;
    async fn delete_info(&self, id: ObjectId) -> Result<(), ServiceError>;
}

pub struct CompanyInfoServiceImpl {
    pub company_repo: Arc<dyn CompanyInfoRepository>,
    pub storage: Storage,
}

impl CompanyInfoServiceImpl {
    pub fn new(company_repo: Arc<dyn CompanyInfoRepository>, storage: Storage) -> Self {
        CompanyInfoServiceImpl { company_repo, storage }
    }

    /// Store the uploads of one form. Returns logo, partner and certification
    /// URLs; anything stored is removed again if a later group fails.
    async fn upload(
        &self,
        folder: &str,
        images: &CompanyImages,
    ) -> Result<(Option<String>, Vec<String>, Vec<String>), ServiceError> {
        let logo_files: Vec<UploadedFile> = images.logo.iter().cloned().collect();
        let logo = store_images(&self.storage, &format!("{}/logo", folder), &logo_files)
            .await?
            .into_iter()
            .next();

        let partners = match store_images(&self.storage, &format!("{}/partners", folder), &images.partners).await {
            Ok(urls) => urls,
            Err(e) => {
                remove_images(&self.storage, &logo.iter().cloned().collect::<Vec<_>>()).await;
                return Err(e);
            }
        };

        let certifications =
            match store_images(&self.storage, &format!("{}/certifications", folder), &images.certifications).await {
                Ok(urls) => urls,
                Err(e) => {
                    let mut stored: Vec<String> = logo.iter().cloned().collect();
                    stored.extend(partners);
                    remove_images(&self.storage, &stored).await;
                    return Err(e);
                }
            };

        Ok((logo, partners, certifications))
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn apply_fields(info: &mut CompanyInfo, request: &CompanyInfoRequest) {
    info.name = request.name.trim().to_string();
    info.phone = trimmed(request.phone.clone());
    info.email = trimmed(request.email.clone());
    info.address = trimmed(request.address.clone());
    info.website = trimmed(request.website.clone());
    info.tax_id = trimmed(request.tax_id.clone());
    info.bank_name = trimmed(request.bank_name.clone());
    info.bank_account = trimmed(request.bank_account.clone());
}

fn keep_listed(current: &[String], keep: &[String]) -> Vec<String> {
    current.iter().filter(|url| keep.contains(*url)).cloned().collect()
}

#[async_trait]
impl CompanyInfoService for CompanyInfoServiceImpl {
    #[instrument(skip(self, request, images), fields(name = %request.name, images = images.count()))]
    async fn create_info(&self, request: CompanyInfoRequest, images: CompanyImages) -> Result<CompanyInfo, ServiceError> {
        let id = ObjectId::new();
        let (logo_url, partner_images, certification_images) =
            self.upload(&format!("company/{}", id), &images).await?;

        let mut info = CompanyInfo {
            id: Some(id),
            name: String::new(),
            phone: None,
            email: None,
            address: None,
            website: None,
            tax_id: None,
            bank_name: None,
            bank_account: None,
            logo_url,
            partner_images,
            certification_images,
            created_at: None,
            updated_at: None,
        };
        apply_fields(&mut info, &request);

        match self.company_repo.create(info.clone()).await {
            Ok(created) => {
                info!(id = %id, "Company info created");
                Ok(created)
            }
            Err(e) => {
                remove_images(&self.storage, &info.image_urls()).await;
                Err(e.into())
            }
        }
    }

    async fn get_info(&self, id: ObjectId) -> Result<CompanyInfo, ServiceError> {
        Ok(self.company_repo.get_by_id(id).await?)
    }

    async fn list_info(&self) -> Result<Vec<CompanyInfo>, ServiceError> {
        Ok(self.company_repo.list().await?)
    }

    async fn current(&self) -> Result<Option<CompanyInfo>, ServiceError> {
        Ok(self.company_repo.first().await?)
    }

    #[instrument(skip(self, request, images), fields(id = %id, images = images.count()))]
    async fn update_info(
        &self,
        id: ObjectId,
        request: CompanyInfoRequest,
        images: CompanyImages,
    ) -> Result<CompanyInfo, ServiceError> {
        let mut info = self.company_repo.get_by_id(id).await?;
        let previous = info.image_urls();

        let (new_logo, new_partners, new_certifications) =
            self.upload(&format!("company/{}", id), &images).await?;

        apply_fields(&mut info, &request);
        info.logo_url = match new_logo {
            Some(url) => Some(url),
            None if request.keep_logo == Some(false) => None,
            None => info.logo_url.take(),
        };
        info.partner_images = keep_listed(&info.partner_images, &request.partner_images)
            .into_iter()
            .chain(new_partners)
            .collect();
        info.certification_images = keep_listed(&info.certification_images, &request.certification_images)
            .into_iter()
            .chain(new_certifications)
            .collect();

        let current = info.image_urls();
        match self.company_repo.replace(info).await {
            Ok(saved) => {
                remove_images(&self.storage, &dropped(&previous, &current)).await;
                Ok(saved)
            }
            Err(e) => {
                remove_images(&self.storage, &dropped(&current, &previous)).await;
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_info(&self, id: ObjectId) -> Result<(), ServiceError> {
        let info = self.company_repo.get_by_id(id).await?;
        self.company_repo.delete(id).await?;
        remove_images(&self.storage, &info.image_urls()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn file(field: &str) -> UploadedFile {
        UploadedFile {
            field: field.to_string(),
            file_name: Some(format!("{}.png", field)),
            content_type: Some("image/png".to_string()),
            data: Bytes::from_static(b"\x89PNG"),
        }
    }

    #[test]
    fn test_images_split_by_field() {
        let form = MultipartForm {
            json: None,
            files: vec![file("partner0"), file("logo"), file("certification0"), file("partner1")],
        };
        let images = CompanyImages::from_form(&form);
        assert_eq!(images.logo.map(|f| f.field), Some("logo".to_string()));
        let partners: Vec<String> = images.partners.into_iter().map(|f| f.field).collect();
        assert_eq!(partners, vec!["partner0", "partner1"]);
        assert_eq!(images.certifications.len(), 1);
    }

    #[test]
    fn test_keep_listed_ignores_unknown_urls() {
        let current = vec!["a".to_string(), "b".to_string()];
        let keep = vec!["b".to_string(), "zzz".to_string()];
        assert_eq!(keep_listed(&current, &keep), vec!["b".to_string()]);
    }
}
