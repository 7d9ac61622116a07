//! In-memory relational store for tests
//!
//! Implements both store capabilities over one shared state so books,
//! categories and their associations behave like the Postgres tables,
//! including cascading association rows on delete.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookFields, Category, CategorySummary},
    repository::{BookStore, CategoryStore},
};

#[derive(Default)]
struct Tables {
    next_book_id: i32,
    next_category_id: i32,
    books: BTreeMap<i32, Book>,
    categories: BTreeMap<i32, Category>,
    /// (book_id, category_id)
    book_categories: BTreeSet<(i32, i32)>,
}

impl Tables {
    fn load(&self, id: i32) -> Option<Book> {
        let mut book = self.books.get(&id)?.clone();
        book.categories = self
            .book_categories
            .iter()
            .filter(|(book_id, _)| *book_id == id)
            .filter_map(|(_, category_id)| self.categories.get(category_id))
            .map(CategorySummary::from)
            .collect();
        Some(book)
    }

    fn replace_categories(&mut self, book_id: i32, category_ids: &[i32]) {
        self.book_categories.retain(|(b, _)| *b != book_id);
        for category_id in category_ids {
            self.book_categories.insert((book_id, *category_id));
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    /// Insert a category directly
    pub fn add_category(&self, name: &str) -> Category {
        let mut tables = self.tables();
        tables.next_category_id += 1;
        let now = Utc::now();
        let category = Category {
            id: tables.next_category_id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.categories.insert(category.id, category.clone());
        category
    }

    pub fn book_count(&self) -> usize {
        self.tables().books.len()
    }

    pub fn association_count(&self) -> usize {
        self.tables().book_categories.len()
    }
}

fn book_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Book {} not found", id))
}

fn category_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Category {} not found", id))
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Category>> {
        Ok(self.tables().categories.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Category> {
        self.tables()
            .categories
            .get(&id)
            .cloned()
            .ok_or_else(|| category_not_found(id))
    }

    async fn create(&self, name: &str) -> AppResult<Category> {
        Ok(self.add_category(name))
    }

    async fn update(&self, id: i32, name: &str) -> AppResult<Category> {
        let mut tables = self.tables();
        let category = tables
            .categories
            .get_mut(&id)
            .ok_or_else(|| category_not_found(id))?;
        category.name = name.to_string();
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables();
        tables
            .categories
            .remove(&id)
            .ok_or_else(|| category_not_found(id))?;
        tables.book_categories.retain(|(_, c)| *c != id);
        Ok(())
    }

    async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<Category>> {
        let tables = self.tables();
        Ok(tables
            .categories
            .values()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Book>> {
        let tables = self.tables();
        Ok(tables.books.keys().filter_map(|id| tables.load(*id)).collect())
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.tables().load(id).ok_or_else(|| book_not_found(id))
    }

    async fn create(&self, fields: &BookFields, category_ids: &[i32]) -> AppResult<Book> {
        let mut tables = self.tables();
        tables.next_book_id += 1;
        let id = tables.next_book_id;
        let now = Utc::now();
        tables.books.insert(
            id,
            Book {
                id,
                title: fields.title.clone(),
                price: fields.price,
                description: fields.description.clone(),
                image_path: fields.image_path.clone(),
                created_at: now,
                updated_at: now,
                categories: Vec::new(),
            },
        );
        tables.replace_categories(id, category_ids);
        tables.load(id).ok_or_else(|| book_not_found(id))
    }

    async fn update(&self, id: i32, fields: &BookFields, category_ids: &[i32]) -> AppResult<Book> {
        let mut tables = self.tables();
        let book = tables.books.get_mut(&id).ok_or_else(|| book_not_found(id))?;
        book.title = fields.title.clone();
        book.price = fields.price;
        book.description = fields.description.clone();
        book.image_path = fields.image_path.clone();
        book.updated_at = Utc::now();
        tables.replace_categories(id, category_ids);
        tables.load(id).ok_or_else(|| book_not_found(id))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables();
        tables.book_categories.retain(|(b, _)| *b != id);
        tables.books.remove(&id).ok_or_else(|| book_not_found(id))?;
        Ok(())
    }
}
