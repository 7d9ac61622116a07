//! Category management service

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Category, CreateCategory, UpdateCategory},
    repository::CategoryStore,
};

#[derive(Clone)]
pub struct CategoriesService {
    store: Arc<dyn CategoryStore>,
}

impl CategoriesService {
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<Category>> {
        self.store.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Category> {
        self.store.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateCategory) -> AppResult<Category> {
        let name = validate_name(&data.name)?;
        let category = self.store.create(name).await?;
        tracing::info!("Created category id={}", category.id);
        Ok(category)
    }

    pub async fn update(&self, id: i32, data: &UpdateCategory) -> AppResult<Category> {
        let name = validate_name(&data.name)?;
        let category = self.store.update(id, name).await?;
        tracing::info!("Updated category id={}", id);
        Ok(category)
    }

    /// Association rows pointing at the category are dropped with it; the
    /// books themselves stay.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.store.delete(id).await?;
        tracing::info!("Deleted category id={}", id);
        Ok(())
    }

    /// Check the backing store is reachable
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}

fn validate_name(name: &str) -> AppResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Category name cannot be empty".to_string()));
    }
    Ok(name)
}
