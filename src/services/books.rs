//! Book management service
//!
//! Owns the consistency between a book row, its category associations and
//! its image file. Writes follow the same order everywhere: resolve the
//! categories, write any new image, commit the row together with its full
//! association set, then drop the file that is no longer referenced.

use std::sync::Arc;

use validator::Validate;

use super::resolver::CategoryResolver;
use crate::{
    error::AppResult,
    models::{Book, BookCommand, BookFields, BookResponse, ImageUpload},
    repository::BookStore,
    storage::FileStore,
};

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn BookStore>,
    resolver: CategoryResolver,
    files: FileStore,
}

impl BooksService {
    pub fn new(store: Arc<dyn BookStore>, resolver: CategoryResolver, files: FileStore) -> Self {
        Self {
            store,
            resolver,
            files,
        }
    }

    /// List all books; an empty catalog gives an empty list
    pub async fn list(&self) -> AppResult<Vec<BookResponse>> {
        let books = self.store.list().await?;
        Ok(books.into_iter().map(|b| self.project(b)).collect())
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<BookResponse> {
        let book = self.store.get_by_id(id).await?;
        Ok(self.project(book))
    }

    /// Create a book with its categories and optional cover image
    pub async fn create(&self, command: BookCommand) -> AppResult<BookResponse> {
        command.validate()?;
        let category_ids = self.resolve_category_ids(&command.category_ids).await?;

        let image_path = self.save_image(command.image.as_ref()).await?;
        let fields = BookFields {
            title: command.title.trim().to_string(),
            price: command.price,
            description: command.description,
            image_path: image_path.clone(),
        };

        let book = match self.store.create(&fields, &category_ids).await {
            Ok(book) => book,
            Err(e) => {
                self.discard_image(image_path.as_deref()).await;
                return Err(e);
            }
        };

        tracing::info!(
            "Created book id={} with {} categories",
            book.id,
            book.categories.len()
        );
        Ok(self.project(book))
    }

    /// Overwrite a book's fields and replace its whole category set. The
    /// stored image is kept unless a new one is supplied.
    pub async fn update(&self, id: i32, command: BookCommand) -> AppResult<BookResponse> {
        command.validate()?;
        let category_ids = self.resolve_category_ids(&command.category_ids).await?;
        let existing = self.store.get_by_id(id).await?;

        let new_image = self.save_image(command.image.as_ref()).await?;
        let fields = BookFields {
            title: command.title.trim().to_string(),
            price: command.price,
            description: command.description,
            image_path: new_image.clone().or_else(|| existing.image_path.clone()),
        };

        let book = match self.store.update(id, &fields, &category_ids).await {
            Ok(book) => book,
            Err(e) => {
                self.discard_image(new_image.as_deref()).await;
                return Err(e);
            }
        };

        if new_image.is_some() {
            self.discard_image(existing.image_path.as_deref()).await;
        }

        tracing::info!(
            "Updated book id={} with {} categories",
            book.id,
            book.categories.len()
        );
        Ok(self.project(book))
    }

    /// Delete a book, its category associations and its image file
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let book = self.store.get_by_id(id).await?;
        self.store.delete(id).await?;
        self.discard_image(book.image_path.as_deref()).await;

        tracing::info!("Deleted book id={}", id);
        Ok(())
    }

    async fn resolve_category_ids(&self, requested: &[i32]) -> AppResult<Vec<i32>> {
        let categories = self.resolver.resolve(requested).await?;
        Ok(categories.iter().map(|c| c.id).collect())
    }

    async fn save_image(&self, image: Option<&ImageUpload>) -> AppResult<Option<String>> {
        match image {
            Some(image) => {
                let reference = self.files.save(&image.content, &image.file_name).await?;
                Ok(Some(reference))
            }
            None => Ok(None),
        }
    }

    async fn discard_image(&self, reference: Option<&str>) {
        if let Some(reference) = reference {
            self.files.delete(reference).await;
        }
    }

    fn project(&self, book: Book) -> BookResponse {
        BookResponse {
            id: book.id,
            title: book.title,
            price: book.price,
            image_path: book.image_path.map(|r| self.files.public_path(&r)),
            description: book.description,
            categories: book.categories,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}
