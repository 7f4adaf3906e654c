//! PolyLib - Polytechnic Library Management System
//!
//! REST JSON API for a polytechnic library: students and admins
//! authenticate with JWT bearer tokens, browse a book catalog filtered by
//! class/level/module, and admins manage book records with attached files.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
