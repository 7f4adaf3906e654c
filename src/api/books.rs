//! Book (catalog) endpoints

use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
    services::storage::UploadedFile,
};

use super::AuthenticatedUser;

/// List books with catalog filters. Students only see available books.
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("class" = Option<String>, Query, description = "Filter by class name"),
        ("level" = Option<String>, Query, description = "Filter by level (NC, ND, HND)"),
        ("module" = Option<String>, Query, description = "Filter by module"),
        ("available" = Option<bool>, Query, description = "Filter by availability (ignored for students)")
    ),
    responses(
        (status = 200, description = "List of books", body = Vec<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.list_books(&claims, &query).await?;
    Ok(Json(books))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Create a book (admin only); multipart form with an optional `file` field
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input or unresolvable class/module"),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Book>)> {
    claims.require_admin()?;

    let form = read_multipart(multipart).await?;
    let book = build_create_book(&form.fields)?;

    // Upload first; the record is only written when the upload succeeded
    let file_ref = match form.file {
        Some(ref file) => Some(state.services.storage.upload_book_file(file).await?),
        None => None,
    };

    let created = state
        .services
        .catalog
        .create_book(book, file_ref.as_ref(), claims.sub)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a book (admin only); multipart, partial
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book ID")),
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid module for the book's class/level"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<Book>> {
    claims.require_admin()?;

    let form = read_multipart(multipart).await?;
    let update = build_update_book(&form.fields)?;

    let file_ref = match form.file {
        Some(ref file) => Some(state.services.storage.upload_book_file(file).await?),
        None => None,
    };

    let updated = state
        .services
        .catalog
        .update_book(id, update, file_ref.as_ref())
        .await?;
    Ok(Json(updated))
}

/// Delete a book (admin only)
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    claims.require_admin()?;

    state.services.catalog.delete_book(id).await?;
    Ok(Json(MessageResponse {
        message: "Book deleted successfully".to_string(),
    }))
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Parsed multipart form: text fields plus at most one `file` part
struct BookForm {
    fields: HashMap<String, String>,
    file: Option<UploadedFile>,
}

async fn read_multipart(mut multipart: Multipart) -> AppResult<BookForm> {
    let mut fields = HashMap::new();
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart request: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "file" {
            let file_name = field.file_name().unwrap_or("file").to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read file field: {}", e)))?;
            file = Some(UploadedFile {
                name: file_name,
                content_type,
                data: data.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read field {}: {}", name, e)))?;
            fields.insert(name, value);
        }
    }

    Ok(BookForm { fields, file })
}

fn required<'a>(fields: &'a HashMap<String, String>, name: &str) -> AppResult<&'a str> {
    fields
        .get(name)
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("{} is required", name)))
}

fn parse_year(value: &str) -> AppResult<i32> {
    value
        .parse()
        .map_err(|_| AppError::Validation("publicationYear must be a number".to_string()))
}

fn parse_bool(value: &str) -> AppResult<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(AppError::Validation(
            "available must be true or false".to_string(),
        )),
    }
}

fn build_create_book(fields: &HashMap<String, String>) -> AppResult<CreateBook> {
    Ok(CreateBook {
        title: required(fields, "title")?.to_string(),
        author: required(fields, "author")?.to_string(),
        isbn: fields.get("isbn").cloned(),
        class: required(fields, "class")?.to_string(),
        module: required(fields, "module")?.to_string(),
        level: required(fields, "level")?
            .parse()
            .map_err(AppError::Validation)?,
        publication_year: fields
            .get("publicationYear")
            .map(|v| parse_year(v))
            .transpose()?,
        publisher: fields.get("publisher").cloned(),
        edition: fields.get("edition").cloned(),
        description: fields.get("description").cloned(),
        available: fields.get("available").map(|v| parse_bool(v)).transpose()?,
    })
}

fn build_update_book(fields: &HashMap<String, String>) -> AppResult<UpdateBook> {
    Ok(UpdateBook {
        title: fields.get("title").cloned(),
        author: fields.get("author").cloned(),
        isbn: fields.get("isbn").cloned(),
        module: fields.get("module").cloned(),
        publication_year: fields
            .get("publicationYear")
            .map(|v| parse_year(v))
            .transpose()?,
        publisher: fields.get("publisher").cloned(),
        edition: fields.get("edition").cloned(),
        description: fields.get("description").cloned(),
        available: fields.get("available").map(|v| parse_bool(v)).transpose()?,
    })
}
