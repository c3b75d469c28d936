use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::dto::category_dto::CategoryDeleteOutcome;
use crate::model::category::{build_trees, Category, CategoryLevel, CategoryTree};
use crate::repository::category_repo::CategoryRepository;
use crate::repository::product_repo::ProductRepository;
use crate::repository::repository_error::RepositoryError;
use crate::util::error::ServiceError;

#[async_trait]
pub trait CategoryService: Send + Sync {
    async fn tree(&self) -> Result<Vec<CategoryTree>, ServiceError>;

    async fn list_main(&self) -> Result<Vec<Category>, ServiceError>;
    async fn create_main(&self, name: &str) -> Result<Category, ServiceError>;
    async fn get_main(&self, main: ObjectId) -> Result<CategoryTree, ServiceError>;
    async fn rename_main(&self, main: ObjectId, name: &str) -> Result<Category, ServiceError>;
    async fn delete_main(&self, main: ObjectId) -> Result<CategoryDeleteOutcome, ServiceError>;

    async fn list_children(&self, main: ObjectId) -> Result<Vec<Category>, ServiceError>;
    async fn add_child(&self, main: ObjectId, name: &str) -> Result<Category, ServiceError>;
    async fn rename_child(&self, main: ObjectId, child: ObjectId, name: &str) -> Result<Category, ServiceError>;
    async fn delete_child(&self, main: ObjectId, child: ObjectId) -> Result<CategoryDeleteOutcome, ServiceError>;

    async fn list_subchildren(&self, main: ObjectId, child: ObjectId) -> Result<Vec<Category>, ServiceError>;
    async fn add_subchild(&self, main: ObjectId, child: ObjectId, name: &str) -> Result<Category, ServiceError>;
    async fn rename_subchild(
        &self,
        main: ObjectId,
        child: ObjectId,
        sub: ObjectId,
        name: &str,
    ) -> Result<Category, ServiceError>;
    async fn delete_subchild(
        &self,
        main: ObjectId,
        child: ObjectId,
        sub: ObjectId,
    ) -> Result<CategoryDeleteOutcome, ServiceError>;
}

pub struct CategoryServiceImpl {
    pub category_repo: Arc<dyn CategoryRepository>,
    pub product_repo: Arc<dyn ProductRepository>,
}

/// Every id in the subtree rooted at `root`, root included.
pub fn subtree_ids(root: ObjectId, all: &[Category]) -> Vec<ObjectId> {
    let mut ids = vec![root];
    let mut cursor = 0;
    while cursor < ids.len() {
        let parent = ids[cursor];
        ids.extend(all.iter().filter(|c| c.parent_id == Some(parent)).filter_map(|c| c.id));
        cursor += 1;
    }
    ids
}

fn clean_name(name: &str) -> Result<String, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput("Category name cannot be empty".to_string()));
    }
    Ok(name.to_string())
}

impl CategoryServiceImpl {
    pub fn new(category_repo: Arc<dyn CategoryRepository>, product_repo: Arc<dyn ProductRepository>) -> Self {
        CategoryServiceImpl {
            category_repo,
            product_repo,
        }
    }

    /// Walk `path` from a main category down, checking each step is a
    /// direct child of the previous one. Any mismatch is a 404.
    async fn resolve(&self, path: &[ObjectId]) -> Result<Category, ServiceError> {
        let mut parent: Option<Category> = None;
        for id in path {
            let expected_level = match &parent {
                None => CategoryLevel::Main,
                Some(p) => p.level.child_level().ok_or_else(|| {
                    ServiceError::NotFound(format!("Category {} cannot have children", p.name))
                })?,
            };
            let node = match self.category_repo.get_by_id(*id).await {
                Ok(node) => node,
                Err(RepositoryError::NotFound(_)) => {
                    return Err(ServiceError::NotFound(format!("{} category {} not found", expected_level.as_str(), id)))
                }
                Err(e) => return Err(e.into()),
            };
            let parent_id = parent.as_ref().and_then(|p| p.id);
            if node.level != expected_level || node.parent_id != parent_id {
                return Err(ServiceError::NotFound(format!(
                    "{} category {} not found under the given parent",
                    expected_level.as_str(),
                    id
                )));
            }
            parent = Some(node);
        }
        parent.ok_or_else(|| ServiceError::InvalidInput("Empty category path".to_string()))
    }

    async fn ensure_unique(
        &self,
        level: CategoryLevel,
        parent: Option<ObjectId>,
        name: &str,
        own_id: Option<ObjectId>,
    ) -> Result<(), ServiceError> {
        let siblings = self.category_repo.list_level(level, parent).await?;
        let taken = siblings
            .iter()
            .any(|s| s.id != own_id && s.name.trim().eq_ignore_ascii_case(name));
        if taken {
            return Err(ServiceError::Conflict(format!(
                "A {} category named '{}' already exists here",
                level.as_str(),
                name
            )));
        }
        Ok(())
    }

    async fn add(&self, parent: Option<Category>, name: &str) -> Result<Category, ServiceError> {
        let name = clean_name(name)?;
        let (level, parent_id) = match &parent {
            None => (CategoryLevel::Main, None),
            Some(p) => {
                let level = p.level.child_level().ok_or_else(|| {
                    ServiceError::InvalidInput(format!("'{}' is a leaf category", p.name))
                })?;
                (level, p.id)
            }
        };
        self.ensure_unique(level, parent_id, &name, None).await?;
        let created = self
            .category_repo
            .create(Category {
                id: None,
                name,
                parent_id,
                level,
                created_at: None,
                updated_at: None,
            })
            .await?;
        info!(id = ?created.id, level = level.as_str(), "Category added");
        Ok(created)
    }

    async fn rename(&self, node: Category, name: &str) -> Result<Category, ServiceError> {
        let name = clean_name(name)?;
        let id = node
            .id
            .ok_or_else(|| ServiceError::InternalError("Stored category without id".to_string()))?;
        self.ensure_unique(node.level, node.parent_id, &name, Some(id)).await?;
        Ok(self.category_repo.rename(id, &name).await?)
    }

    /// Remove `node` with its whole subtree and detach the products filed
    /// under any removed category.
    async fn remove(&self, node: Category) -> Result<CategoryDeleteOutcome, ServiceError> {
        let id = node
            .id
            .ok_or_else(|| ServiceError::InternalError("Stored category without id".to_string()))?;
        let all = self.category_repo.list_all().await?;
        let ids = subtree_ids(id, &all);
        let detached_products = self.product_repo.clear_category(&ids).await?;
        let removed_categories = self.category_repo.delete_many(&ids).await?;
        info!(
            root = %id,
            removed_categories,
            detached_products,
            "Category subtree deleted"
        );
        Ok(CategoryDeleteOutcome {
            removed_categories,
            detached_products,
        })
    }

    async fn list_under(&self, parent: Category) -> Result<Vec<Category>, ServiceError> {
        let Some(level) = parent.level.child_level() else {
            return Ok(Vec::new());
        };
        Ok(self.category_repo.list_level(level, parent.id).await?)
    }
}

#[async_trait]
impl CategoryService for CategoryServiceImpl {
    #[instrument(skip(self))]
    async fn tree(&self) -> Result<Vec<CategoryTree>, ServiceError> {
        let all = self.category_repo.list_all().await?;
        Ok(build_trees(&all))
    }

    async fn list_main(&self) -> Result<Vec<Category>, ServiceError> {
        Ok(self.category_repo.list_level(CategoryLevel::Main, None).await?)
    }

    #[instrument(skip(self))]
    async fn create_main(&self, name: &str) -> Result<Category, ServiceError> {
        self.add(None, name).await
    }

    async fn get_main(&self, main: ObjectId) -> Result<CategoryTree, ServiceError> {
        self.resolve(&[main]).await?;
        let all = self.category_repo.list_all().await?;
        build_trees(&all)
            .into_iter()
            .find(|tree| tree.id == main)
            .ok_or_else(|| ServiceError::NotFound(format!("main category {} not found", main)))
    }

    #[instrument(skip(self))]
    async fn rename_main(&self, main: ObjectId, name: &str) -> Result<Category, ServiceError> {
        let node = self.resolve(&[main]).await?;
        self.rename(node, name).await
    }

    #[instrument(skip(self))]
    async fn delete_main(&self, main: ObjectId) -> Result<CategoryDeleteOutcome, ServiceError> {
        let node = self.resolve(&[main]).await?;
        self.remove(node).await
    }

    async fn list_children(&self, main: ObjectId) -> Result<Vec<Category>, ServiceError> {
        let node = self.resolve(&[main]).await?;
        self.list_under(node).await
    }

    #[instrument(skip(self))]
    async fn add_child(&self, main: ObjectId, name: &str) -> Result<Category, ServiceError> {
        let parent = self.resolve(&[main]).await?;
        self.add(Some(parent), name).await
    }

    #[instrument(skip(self))]
    async fn rename_child(&self, main: ObjectId, child: ObjectId, name: &str) -> Result<Category, ServiceError> {
        let node = self.resolve(&[main, child]).await?;
        self.rename(node, name).await
    }

    #[instrument(skip(self))]
    async fn delete_child(&self, main: ObjectId, child: ObjectId) -> Result<CategoryDeleteOutcome, ServiceError> {
        let node = self.resolve(&[main, child]).await?;
        self.remove(node).await
    }

    async fn list_subchildren(&self, main: ObjectId, child: ObjectId) -> Result<Vec<Category>, ServiceError> {
        let node = self.resolve(&[main, child]).await?;
        self.list_under(node).await
    }

    #[instrument(skip(self))]
    async fn add_subchild(&self, main: ObjectId, child: ObjectId, name: &str) -> Result<Category, ServiceError> {
        let parent = self.resolve(&[main, child]).await?;
        self.add(Some(parent), name).await
    }

    #[instrument(skip(self))]
    async fn rename_subchild(
        &self,
        main: ObjectId,
        child: ObjectId,
        sub: ObjectId,
        name: &str,
    ) -> Result<Category, ServiceError> {
        let node = self.resolve(&[main, child, sub]).await?;
        self.rename(node, name).await
    }

    #[instrument(skip(self))]
    async fn delete_subchild(
        &self,
        main: ObjectId,
        child: ObjectId,
        sub: ObjectId,
    ) -> Result<CategoryDeleteOutcome, ServiceError> {
        let node = self.resolve(&[main, child, sub]).await?;
        self.remove(node).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(parent: Option<ObjectId>, level: CategoryLevel) -> Category {
        Category {
            id: Some(ObjectId::new()),
            name: "x".to_string(),
            parent_id: parent,
            level,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_subtree_ids_collects_all_levels() {
        let main = category(None, CategoryLevel::Main);
        let child = category(main.id, CategoryLevel::Child);
        let sub = category(child.id, CategoryLevel::Subchild);
        let other = category(None, CategoryLevel::Main);
        let all = vec![main.clone(), child.clone(), sub.clone(), other];

        let ids = subtree_ids(main.id.unwrap(), &all);
        assert_eq!(ids, vec![main.id.unwrap(), child.id.unwrap(), sub.id.unwrap()]);
        assert_eq!(subtree_ids(sub.id.unwrap(), &all), vec![sub.id.unwrap()]);
    }
}
