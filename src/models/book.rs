//! Book model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Full book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    /// Unique catalog identifier
    pub isbn: String,
    pub publisher: String,
    pub publish_date: NaiveDate,
    pub category: String,
    pub description: Option<String>,
    /// Number of copies currently available to loan, never negative
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    #[validate(length(min = 10, max = 20, message = "ISBN must be 10-20 characters"))]
    pub isbn: String,
    pub publisher: String,
    pub publish_date: NaiveDate,
    pub category: String,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: i32,
}

/// Update book request (admin override; may set stock directly)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    #[validate(length(min = 10, max = 20, message = "ISBN must be 10-20 characters"))]
    pub isbn: String,
    pub publisher: String,
    pub publish_date: NaiveDate,
    pub category: String,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: i32,
}

/// Book search query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookSearchQuery {
    /// Matched against title, author and ISBN
    pub q: Option<String>,
}

/// ISBN check query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct IsbnQuery {
    pub isbn: String,
}

/// ISBN check response
#[derive(Serialize, ToSchema)]
pub struct IsbnCheckResponse {
    pub exists: bool,
}
