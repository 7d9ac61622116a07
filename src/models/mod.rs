//! Data models for the bookstore

pub mod book;
pub mod category;

pub use book::{Book, BookCommand, BookFields, BookResponse, ImageUpload};
pub use category::{Category, CategorySummary, CreateCategory, UpdateCategory};
