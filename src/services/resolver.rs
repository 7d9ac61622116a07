//! Category resolution for book writes

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::Category,
    repository::CategoryStore,
};

/// Turns requested category ids into existing category records
#[derive(Clone)]
pub struct CategoryResolver {
    categories: Arc<dyn CategoryStore>,
}

impl CategoryResolver {
    pub fn new(categories: Arc<dyn CategoryStore>) -> Self {
        Self { categories }
    }

    /// Fetch every requested category, ordered by id. Duplicates in `ids`
    /// count once. Fails with `InvalidInput` listing the unknown ids if any
    /// is missing.
    pub async fn resolve(&self, ids: &[i32]) -> AppResult<Vec<Category>> {
        let requested: BTreeSet<i32> = ids.iter().copied().collect();
        if requested.is_empty() {
            return Ok(Vec::new());
        }

        let distinct: Vec<i32> = requested.iter().copied().collect();
        let mut found = self.categories.find_by_ids(&distinct).await?;
        found.sort_by_key(|c| c.id);
        found.dedup_by_key(|c| c.id);

        if found.len() != requested.len() {
            let present: BTreeSet<i32> = found.iter().map(|c| c.id).collect();
            let missing: Vec<String> = requested
                .difference(&present)
                .map(|id| id.to_string())
                .collect();
            return Err(AppError::InvalidInput(format!(
                "Some category IDs do not exist: {}",
                missing.join(", ")
            )));
        }

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockCategoryStore;
    use chrono::Utc;

    fn category(id: i32, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_empty_request_skips_store() {
        // no expectations: any store call would panic
        let resolver = CategoryResolver::new(Arc::new(MockCategoryStore::new()));
        assert!(resolver.resolve(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicates_are_queried_once() {
        let mut store = MockCategoryStore::new();
        store
            .expect_find_by_ids()
            .withf(|ids| ids.to_vec() == vec![1, 2])
            .times(1)
            .returning(|_| Ok(vec![category(2, "Sci-Fi"), category(1, "Fiction")]));

        let resolver = CategoryResolver::new(Arc::new(store));
        let resolved = resolver.resolve(&[2, 1, 2, 1]).await.unwrap();

        let ids: Vec<i32> = resolved.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_missing_ids_are_named() {
        let mut store = MockCategoryStore::new();
        store
            .expect_find_by_ids()
            .returning(|_| Ok(vec![category(1, "Fiction")]));

        let resolver = CategoryResolver::new(Arc::new(store));
        let err = resolver.resolve(&[999, 1, 4]).await.unwrap_err();

        match err {
            AppError::InvalidInput(msg) => {
                assert_eq!(msg, "Some category IDs do not exist: 4, 999")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MockCategoryStore::new();
        store
            .expect_find_by_ids()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let resolver = CategoryResolver::new(Arc::new(store));
        let err = resolver.resolve(&[1]).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
