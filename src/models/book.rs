//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::category::CategorySummary;

/// Stored book row, with its associated categories loaded separately
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    /// Price in minor currency unit
    pub price: i32,
    pub description: String,
    /// File store reference of the cover image
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(default)]
    pub categories: Vec<CategorySummary>,
}

/// Column values written to the books table on insert or update
#[derive(Debug, Clone, PartialEq)]
pub struct BookFields {
    pub title: String,
    pub price: i32,
    pub description: String,
    pub image_path: Option<String>,
}

/// Uploaded image payload
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Name given by the client, only its extension is kept
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Create or update command for a book, as decoded from the request
#[derive(Debug, Clone, Validate)]
pub struct BookCommand {
    #[validate(custom(function = "not_blank", message = "Title is required"))]
    pub title: String,
    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price: i32,
    pub description: String,
    pub category_ids: Vec<i32>,
    pub image: Option<ImageUpload>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Book as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    pub id: i32,
    pub title: String,
    pub price: i32,
    /// Public URL path of the cover image
    pub image_path: Option<String>,
    pub description: String,
    pub categories: Vec<CategorySummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
