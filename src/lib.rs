//! Bookshelf Library Catalog
//!
//! Server-rendered web application for browsing a book catalog, borrowing
//! and returning books, and administering books and members, on top of a
//! document store.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod web;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use repository::Repository;
use services::Services;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<Services>,
    /// Encrypts the session and flash cookies
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(config: AppConfig, repository: Repository, cookie_key: Key) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(Services::new(repository)),
            cookie_key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
