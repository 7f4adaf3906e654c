//! File ingestion service backed by an object store.
//!
//! Uploaded book files are written under `{folder}/{timestamp}_{filename}`
//! and referenced by public URL. Replaced or orphaned objects are not
//! cleaned up; `ObjectStore::delete` exists so a cleanup job can be added.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;

use crate::{
    config::StorageConfig,
    error::{AppError, AppResult},
    models::book::FileRef,
};

/// MIME types accepted for book uploads (declared type, no content sniffing)
pub const ALLOWED_FILE_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// An uploaded file as received from a multipart request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Abstraction over the external object store
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write an object and return its public URL
    async fn put(&self, key: &str, content_type: &str, data: &[u8]) -> AppResult<String>;

    /// Remove an object
    async fn delete(&self, key: &str) -> AppResult<()>;
}

/// Local filesystem object store; objects are served read-only by the
/// server itself under the configured public base URL.
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    /// Create a store rooted at the given path, creating it if needed
    pub async fn new(root: &str, public_base_url: &str) -> AppResult<Self> {
        let root = PathBuf::from(root);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create storage root {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key.trim_start_matches('/'))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, _content_type: &str, data: &[u8]) -> AppResult<String> {
        let path = self.resolve(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", path.display(), e)))?;

        tracing::debug!(key, bytes = data.len(), "Stored object");
        Ok(format!("{}/{}", self.public_base_url, key))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key);
        fs::remove_file(&path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete {}: {}", path.display(), e)))
    }
}

/// Storage service handling book file uploads
#[derive(Clone)]
pub struct StorageService {
    store: Arc<dyn ObjectStore>,
    folder: String,
}

impl StorageService {
    pub fn new(store: Arc<dyn ObjectStore>, config: &StorageConfig) -> Self {
        Self {
            store,
            folder: config.folder.clone(),
        }
    }

    /// Validate and upload a book file, returning its stored reference
    pub async fn upload_book_file(&self, file: &UploadedFile) -> AppResult<FileRef> {
        if !ALLOWED_FILE_TYPES.contains(&file.content_type.as_str()) {
            return Err(AppError::Validation(format!(
                "File type {} is not allowed. Only PDF and Word documents are accepted",
                file.content_type
            )));
        }

        let name = sanitize_filename(&file.name);
        let key = format!("{}/{}_{}", self.folder, Utc::now().timestamp_millis(), name);
        let url = self.store.put(&key, &file.content_type, &file.data).await?;

        tracing::info!(key, content_type = %file.content_type, "Uploaded book file");

        Ok(FileRef {
            url,
            name: file.name.clone(),
            content_type: file.content_type.clone(),
        })
    }
}

/// Strip path separators and other characters unsafe in object keys
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim_matches('.').trim();
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service(dir: &tempfile::TempDir) -> StorageService {
        let config = StorageConfig {
            root: dir.path().to_string_lossy().into_owned(),
            public_base_url: "http://localhost:5000/files".to_string(),
            folder: "books".to_string(),
        };
        let store = LocalObjectStore::new(&config.root, &config.public_base_url)
            .await
            .unwrap();
        StorageService::new(Arc::new(store), &config)
    }

    #[tokio::test]
    async fn rejects_disallowed_mime_type() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir).await;
        let file = UploadedFile {
            name: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
            data: b"hello".to_vec(),
        };
        let err = svc.upload_book_file(&file).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn stores_pdf_under_books_folder() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir).await;
        let file = UploadedFile {
            name: "syllabus.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: b"%PDF-1.4".to_vec(),
        };
        let stored = svc.upload_book_file(&file).await.unwrap();
        assert!(stored.url.starts_with("http://localhost:5000/files/books/"));
        assert!(stored.url.ends_with("_syllabus.pdf"));
        assert_eq!(stored.name, "syllabus.pdf");
        assert_eq!(stored.content_type, "application/pdf");

        // The object really landed on disk under books/
        let books_dir = dir.path().join("books");
        assert_eq!(std::fs::read_dir(books_dir).unwrap().count(), 1);
    }

    #[test]
    fn filename_sanitization() {
        let traversal = sanitize_filename("../../etc/passwd");
        assert!(!traversal.contains('/'));
        assert!(!traversal.starts_with('.'));
        assert_eq!(sanitize_filename("my report.docx"), "my report.docx");
        assert_eq!(sanitize_filename(""), "file");
    }
}
