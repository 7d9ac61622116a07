//! Repository layer for database operations
//!
//! Services talk to the relational store through the [`BookStore`] and
//! [`CategoryStore`] capabilities; the Postgres implementations live in the
//! submodules.

pub mod books;
pub mod categories;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{Book, BookFields, Category},
};

/// Relational store capability for categories
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// All categories ordered by id
    async fn list(&self) -> AppResult<Vec<Category>>;

    /// `NotFound` if the id does not exist
    async fn get_by_id(&self, id: i32) -> AppResult<Category>;

    async fn create(&self, name: &str) -> AppResult<Category>;

    /// `NotFound` if the id does not exist
    async fn update(&self, id: i32, name: &str) -> AppResult<Category>;

    /// `NotFound` if the id does not exist. Association rows referencing the
    /// category go with it.
    async fn delete(&self, id: i32) -> AppResult<()>;

    /// Categories whose id is in `ids`, ordered by id. Unknown ids are simply
    /// absent from the result.
    async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<Category>>;

    /// Round trip to the backing store
    async fn ping(&self) -> AppResult<()>;
}

/// Relational store capability for books and their category associations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books with their categories, ordered by id
    async fn list(&self) -> AppResult<Vec<Book>>;

    /// `NotFound` if the id does not exist
    async fn get_by_id(&self, id: i32) -> AppResult<Book>;

    /// Insert the row and set its association set in one transaction
    async fn create(&self, fields: &BookFields, category_ids: &[i32]) -> AppResult<Book>;

    /// Overwrite the row and replace its whole association set in one
    /// transaction. `NotFound` if the id does not exist.
    async fn update(&self, id: i32, fields: &BookFields, category_ids: &[i32]) -> AppResult<Book>;

    /// Remove association rows then the row. `NotFound` if the id does not
    /// exist.
    async fn delete(&self, id: i32) -> AppResult<()>;
}

/// Postgres-backed stores sharing one connection pool
#[derive(Clone)]
pub struct Repository {
    pub books: books::BooksRepository,
    pub categories: categories::CategoriesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            categories: categories::CategoriesRepository::new(pool),
        }
    }
}
