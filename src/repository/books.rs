//! Books repository for database operations

use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book::{AddedBy, Book, CreateBook, FileRef, UpdateBook},
    models::class::Level,
};

/// Shared SELECT of a book joined with its class and uploader
const BOOK_SELECT: &str = r#"
    SELECT b.id, b.title, b.author, b.isbn,
           c.name AS class_name,
           b.module, b.level,
           b.publication_year, b.publisher, b.edition, b.description,
           b.file_url, b.file_name, b.file_type,
           b.available, b.created_at,
           u.id AS added_by_id, u.name AS added_by_name, u.email AS added_by_email
    FROM books b
    JOIN classes c ON c.id = b.class_id
    LEFT JOIN users u ON u.id = b.added_by
"#;

fn map_book_row(row: &PgRow) -> Result<Book, sqlx::Error> {
    let added_by = match row.try_get::<Option<Uuid>, _>("added_by_id")? {
        Some(id) => Some(AddedBy {
            id,
            name: row.try_get("added_by_name")?,
            email: row.try_get("added_by_email")?,
        }),
        None => None,
    };

    Ok(Book {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        isbn: row.try_get("isbn")?,
        class_name: row.try_get("class_name")?,
        module: row.try_get("module")?,
        level: row.try_get("level")?,
        publication_year: row.try_get("publication_year")?,
        publisher: row.try_get("publisher")?,
        edition: row.try_get("edition")?,
        description: row.try_get("description")?,
        file_url: row.try_get("file_url")?,
        file_name: row.try_get("file_name")?,
        file_type: row.try_get("file_type")?,
        available: row.try_get("available")?,
        added_by,
        created_at: row.try_get("created_at")?,
    })
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID with uploader expanded
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        let row = sqlx::query(&format!("{BOOK_SELECT} WHERE b.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

        Ok(map_book_row(&row)?)
    }

    /// List books with equality filters, most recently created first.
    /// NULL filter values are ignored.
    pub async fn search(
        &self,
        class_name: Option<&str>,
        level: Option<Level>,
        module: Option<&str>,
        available: Option<bool>,
    ) -> AppResult<Vec<Book>> {
        let rows = sqlx::query(&format!(
            r#"
            {BOOK_SELECT}
            WHERE ($1::text IS NULL OR c.name = $1)
              AND ($2::text IS NULL OR b.level = $2)
              AND ($3::text IS NULL OR b.module = $3)
              AND ($4::boolean IS NULL OR b.available = $4)
            ORDER BY b.created_at DESC
            "#
        ))
        .bind(class_name)
        .bind(level.map(|l| l.as_str()))
        .bind(module)
        .bind(available)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(map_book_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(AppError::Database)
    }

    /// Insert a book and return it with the uploader expanded
    pub async fn create(
        &self,
        book: &CreateBook,
        class_id: Uuid,
        file: Option<&FileRef>,
        added_by: Uuid,
    ) -> AppResult<Book> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author, isbn, class_id, module, level,
                               publication_year, publisher, edition, description,
                               file_url, file_name, file_type, available, added_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(class_id)
        .bind(&book.module)
        .bind(book.level)
        .bind(book.publication_year)
        .bind(&book.publisher)
        .bind(&book.edition)
        .bind(&book.description)
        .bind(file.map(|f| f.url.as_str()))
        .bind(file.map(|f| f.name.as_str()))
        .bind(file.map(|f| f.content_type.as_str()))
        .bind(book.available.unwrap_or(true))
        .bind(added_by)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Partial update; absent fields keep their current value. A supplied
    /// file reference replaces the stored one.
    pub async fn update(
        &self,
        id: Uuid,
        update: &UpdateBook,
        file: Option<&FileRef>,
    ) -> AppResult<Book> {
        let result = sqlx::query(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                isbn = COALESCE($4, isbn),
                module = COALESCE($5, module),
                publication_year = COALESCE($6, publication_year),
                publisher = COALESCE($7, publisher),
                edition = COALESCE($8, edition),
                description = COALESCE($9, description),
                available = COALESCE($10, available),
                file_url = COALESCE($11, file_url),
                file_name = COALESCE($12, file_name),
                file_type = COALESCE($13, file_type)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.author)
        .bind(&update.isbn)
        .bind(&update.module)
        .bind(update.publication_year)
        .bind(&update.publisher)
        .bind(&update.edition)
        .bind(&update.description)
        .bind(update.available)
        .bind(file.map(|f| f.url.as_str()))
        .bind(file.map(|f| f.name.as_str()))
        .bind(file.map(|f| f.content_type.as_str()))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Book not found".to_string()));
        }

        self.get_by_id(id).await
    }

    /// Hard delete; the stored file object is intentionally left in place
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Book not found".to_string()));
        }
        Ok(())
    }
}
