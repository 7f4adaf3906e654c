//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::class::Level;

/// Uploader display fields embedded in book responses
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AddedBy {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// A catalog book, as returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    /// Name of the referenced class
    #[serde(rename = "class")]
    pub class_name: String,
    pub module: String,
    pub level: Level,
    pub publication_year: Option<i32>,
    pub publisher: Option<String>,
    pub edition: Option<String>,
    pub description: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub available: bool,
    pub added_by: Option<AddedBy>,
    pub created_at: DateTime<Utc>,
}

/// Book listing filters
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BookQuery {
    /// Filter by class name
    pub class: Option<String>,
    pub level: Option<Level>,
    pub module: Option<String>,
    pub available: Option<bool>,
}

/// Create book request (multipart text fields)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub isbn: Option<String>,
    /// Class name; resolved against (class, level) at creation
    pub class: String,
    pub module: String,
    pub level: Level,
    pub publication_year: Option<i32>,
    pub publisher: Option<String>,
    pub edition: Option<String>,
    pub description: Option<String>,
    /// Defaults to true when absent
    pub available: Option<bool>,
}

/// Partial book update request (multipart text fields)
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    /// Re-validated against the book's current class/level when present
    pub module: Option<String>,
    pub publication_year: Option<i32>,
    pub publisher: Option<String>,
    pub edition: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

/// Stored file reference attached to a book
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FileRef {
    pub url: String,
    pub name: String,
    #[serde(rename = "type")]
    pub content_type: String,
}
