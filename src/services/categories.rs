//! Categories service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::category::{Category, CreateCategory},
    repository::Repository,
};

#[derive(Clone)]
pub struct CategoriesService {
    repository: Repository,
}

impl CategoriesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List categories ordered by name
    pub async fn list(&self) -> AppResult<Vec<Category>> {
        self.repository.list_categories().await
    }

    /// Create a category
    pub async fn create(&self, data: &CreateCategory) -> AppResult<Category> {
        let name = data.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Category name cannot be empty".to_string()));
        }
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let category = self.repository.create_category(name).await?;
        tracing::info!("Created category {} ({})", category.id, category.name);
        Ok(category)
    }
}
