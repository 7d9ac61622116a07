//! Business logic services

pub mod books;
pub mod categories;
pub mod resolver;

use std::sync::Arc;

use crate::{
    repository::{BookStore, CategoryStore, Repository},
    storage::FileStore,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub categories: categories::CategoriesService,
}

impl Services {
    /// Wire services over arbitrary store implementations
    pub fn new(
        books: Arc<dyn BookStore>,
        categories: Arc<dyn CategoryStore>,
        files: FileStore,
    ) -> Self {
        let resolver = resolver::CategoryResolver::new(categories.clone());
        Self {
            books: books::BooksService::new(books, resolver, files),
            categories: categories::CategoriesService::new(categories),
        }
    }

    /// Wire services over the Postgres repository
    pub fn from_repository(repository: Repository, files: FileStore) -> Self {
        Self::new(
            Arc::new(repository.books),
            Arc::new(repository.categories),
            files,
        )
    }
}
