//! Book endpoints
//!
//! Create and update take `multipart/form-data` so the cover image can travel
//! with the book fields.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::{multipart::Field, Multipart};
use utoipa::ToSchema;

use super::{ApiMultipart, ApiPath};
use crate::{
    error::{AppError, AppResult},
    models::{BookCommand, BookResponse, ImageUpload},
    AppState,
};

/// Multipart form accepted by create and update
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct BookForm {
    title: String,
    /// Price in minor currency unit
    price: i32,
    description: Option<String>,
    /// Comma-separated category IDs, e.g. `1,4`
    categories: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    image: Option<Vec<u8>>,
}

/// List all books with their categories
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "Book list", body = Vec<BookResponse>)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<BookResponse>>> {
    let books = state.services.books.list().await?;
    Ok(Json(books))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<BookResponse>> {
    let book = state.services.books.get_by_id(id).await?;
    Ok(Json(book))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body(content = BookForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid input or unknown category", body = crate::error::ErrorResponse),
        (status = 500, description = "Image or database failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    ApiMultipart(multipart): ApiMultipart,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    let command = read_book_form(multipart).await?;
    let book = state.services.books.create(command).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book, replacing its categories and optionally its image
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body(content = BookForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 400, description = "Invalid input or unknown category", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiMultipart(multipart): ApiMultipart,
) -> AppResult<Json<BookResponse>> {
    let command = read_book_form(multipart).await?;
    let book = state.services.books.update(id, command).await?;
    Ok(Json(book))
}

/// Delete a book and its image
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    state.services.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn read_book_form(mut multipart: Multipart) -> AppResult<BookCommand> {
    let mut title = None;
    let mut price = None;
    let mut description = String::new();
    let mut category_ids = Vec::new();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_body)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = Some(read_text(field).await?),
            "price" => {
                let raw = read_text(field).await?;
                let value = raw
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| AppError::InvalidInput(format!("Invalid price: {}", raw)))?;
                price = Some(value);
            }
            "description" => description = read_text(field).await?,
            "categories" => category_ids.extend(parse_category_ids(&read_text(field).await?)?),
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content = field.bytes().await.map_err(invalid_body)?;
                // browsers send an empty part when no file is picked
                if !content.is_empty() {
                    image = Some(ImageUpload {
                        file_name,
                        content: content.to_vec(),
                    });
                }
            }
            other => tracing::debug!("Ignoring unknown form field {:?}", other),
        }
    }

    Ok(BookCommand {
        title: title.ok_or_else(|| AppError::InvalidInput("Title is required".to_string()))?,
        price: price.ok_or_else(|| AppError::InvalidInput("Price is required".to_string()))?,
        description,
        category_ids,
        image,
    })
}

async fn read_text(field: Field) -> AppResult<String> {
    field.text().await.map_err(invalid_body)
}

fn invalid_body(e: impl std::fmt::Display) -> AppError {
    AppError::InvalidInput(format!("Invalid multipart body: {}", e))
}

/// Parse `"1, 2,3"` into ids. Blank input means no categories.
fn parse_category_ids(raw: &str) -> AppResult<Vec<i32>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i32>()
                .map_err(|_| AppError::InvalidInput(format!("Invalid category ID: {}", s)))
        })
        .collect()
}
