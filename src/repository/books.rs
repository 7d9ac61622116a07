//! Books repository

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgConnection, Pool, Postgres, Row};

use super::BookStore;
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookFields, CategorySummary},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

// =========================================================================
// ASSOCIATIONS (book_categories junction)
// =========================================================================

/// Load categories for a set of books via the book_categories junction table
async fn load_categories(
    conn: &mut PgConnection,
    book_ids: &[i32],
) -> AppResult<HashMap<i32, Vec<CategorySummary>>> {
    let rows = sqlx::query(
        r#"
        SELECT bc.book_id, c.id, c.name
        FROM book_categories bc
        JOIN categories c ON c.id = bc.category_id
        WHERE bc.book_id = ANY($1)
        ORDER BY bc.book_id, c.id
        "#,
    )
    .bind(book_ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_book: HashMap<i32, Vec<CategorySummary>> = HashMap::new();
    for row in rows {
        by_book
            .entry(row.get("book_id"))
            .or_default()
            .push(CategorySummary {
                id: row.get("id"),
                name: row.get("name"),
            });
    }
    Ok(by_book)
}

/// Replace all categories for a book: delete existing rows then insert the new set.
async fn replace_categories(
    conn: &mut PgConnection,
    book_id: i32,
    category_ids: &[i32],
) -> AppResult<()> {
    sqlx::query("DELETE FROM book_categories WHERE book_id = $1")
        .bind(book_id)
        .execute(&mut *conn)
        .await?;

    if category_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO book_categories (book_id, category_id)
        SELECT $1, UNNEST($2::int[])
        ON CONFLICT (book_id, category_id) DO NOTHING
        "#,
    )
    .bind(book_id)
    .bind(category_ids)
    .execute(&mut *conn)
    .await
    .map_err(missing_category)?;

    Ok(())
}

/// A category removed after the ids were resolved trips the foreign key
fn missing_category(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
            AppError::InvalidInput("Some category IDs do not exist".to_string())
        }
        _ => AppError::Database(e),
    }
}

const FOREIGN_KEY_VIOLATION: &str = "23503";

async fn with_categories(conn: &mut PgConnection, mut book: Book) -> AppResult<Book> {
    let mut by_book = load_categories(conn, &[book.id]).await?;
    book.categories = by_book.remove(&book.id).unwrap_or_default();
    Ok(book)
}

#[async_trait]
impl BookStore for BooksRepository {
    // =========================================================================
    // READ
    // =========================================================================

    async fn list(&self) -> AppResult<Vec<Book>> {
        let mut conn = self.pool.acquire().await?;

        let mut books = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, price, description, image_path, created_at, updated_at
            FROM books
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        if books.is_empty() {
            return Ok(books);
        }

        let ids: Vec<i32> = books.iter().map(|b| b.id).collect();
        let mut by_book = load_categories(&mut conn, &ids).await?;
        for book in &mut books {
            book.categories = by_book.remove(&book.id).unwrap_or_default();
        }

        Ok(books)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let mut conn = self.pool.acquire().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, price, description, image_path, created_at, updated_at
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        with_categories(&mut conn, book).await
    }

    // =========================================================================
    // CREATE
    // =========================================================================

    async fn create(&self, fields: &BookFields, category_ids: &[i32]) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, price, description, image_path)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, price, description, image_path, created_at, updated_at
            "#,
        )
        .bind(&fields.title)
        .bind(fields.price)
        .bind(&fields.description)
        .bind(&fields.image_path)
        .fetch_one(&mut *tx)
        .await?;

        replace_categories(&mut tx, book.id, category_ids).await?;
        let book = with_categories(&mut tx, book).await?;

        tx.commit().await?;
        Ok(book)
    }

    // =========================================================================
    // UPDATE
    // =========================================================================

    async fn update(&self, id: i32, fields: &BookFields, category_ids: &[i32]) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = $1,
                price = $2,
                description = $3,
                image_path = $4,
                updated_at = NOW()
            WHERE id = $5
            RETURNING id, title, price, description, image_path, created_at, updated_at
            "#,
        )
        .bind(&fields.title)
        .bind(fields.price)
        .bind(&fields.description)
        .bind(&fields.image_path)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        replace_categories(&mut tx, id, category_ids).await?;
        let book = with_categories(&mut tx, book).await?;

        tx.commit().await?;
        Ok(book)
    }

    // =========================================================================
    // DELETE
    // =========================================================================

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM book_categories WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }
}
