//! Repository layer for document store operations
//!
//! Handlers and services only see the [`BookStore`] and [`UserStore`]
//! traits. [`Repository`] bundles one implementation of each and is built
//! once at startup, either on top of MongoDB or fully in memory.

pub mod books;
pub mod memory;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use mongodb::Database;
use thiserror::Error;

use crate::models::{Book, BookDocument, BookFields, CategoryCount, NewUser, User, UserFields};

/// Failure kinds surfaced by the persistence layer
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Malformed identifier: {0}")]
    MalformedId(String),

    #[error("No {collection} document with id {id}")]
    Missing { collection: &'static str, id: String },

    #[error("Document store failure: {0}")]
    Backend(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Parse a hex document identifier
pub fn parse_id(id: &str) -> StoreResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| StoreError::MalformedId(id.to_string()))
}

/// Category listing filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookQuery {
    pub category: String,
    /// Case-insensitive literal substring matched against title or author
    pub search: Option<String>,
    pub skip: u64,
    pub limit: u64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn count(&self) -> StoreResult<u64>;

    /// Distinct categories with their book counts, most populated first
    async fn category_counts(&self) -> StoreResult<Vec<CategoryCount>>;

    /// Newest books first
    async fn recent(&self, limit: u64) -> StoreResult<Vec<Book>>;

    /// One page of a category listing plus the total number of matches
    async fn search(&self, query: &BookQuery) -> StoreResult<(Vec<Book>, u64)>;

    async fn list(&self) -> StoreResult<Vec<Book>>;

    async fn get(&self, id: &str) -> StoreResult<Book>;

    /// Insert a new book with an empty borrower list, returning its id
    async fn insert(&self, fields: &BookFields) -> StoreResult<String>;

    async fn update(&self, id: &str, fields: &BookFields) -> StoreResult<()>;

    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Add `user_id` to the borrower list unless already present
    async fn add_borrower(&self, id: &str, user_id: &str) -> StoreResult<()>;

    /// Remove every occurrence of `user_id` from the borrower list
    async fn remove_borrower(&self, id: &str, user_id: &str) -> StoreResult<()>;

    /// Insert a fully formed document, used when seeding
    async fn insert_document(&self, book: BookDocument) -> StoreResult<String>;

    async fn clear(&self) -> StoreResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn count(&self) -> StoreResult<u64>;

    async fn list(&self) -> StoreResult<Vec<User>>;

    async fn get(&self, id: &str) -> StoreResult<User>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn insert(&self, user: &NewUser) -> StoreResult<String>;

    async fn update(&self, id: &str, fields: &UserFields) -> StoreResult<()>;

    async fn delete(&self, id: &str) -> StoreResult<()>;

    async fn clear(&self) -> StoreResult<()>;
}

/// Main repository struct holding one store per collection
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
    pub users: Arc<dyn UserStore>,
}

impl Repository {
    pub fn new(books: Arc<dyn BookStore>, users: Arc<dyn UserStore>) -> Self {
        Self { books, users }
    }

    /// Repository backed by the `books` and `users` collections of `db`
    pub fn mongo(db: &Database) -> Self {
        Self::new(
            Arc::new(books::BooksRepository::new(db)),
            Arc::new(users::UsersRepository::new(db)),
        )
    }

    /// Process-local repository, empty on creation
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(memory::MemoryBooks::default()),
            Arc::new(memory::MemoryUsers::default()),
        )
    }
}
