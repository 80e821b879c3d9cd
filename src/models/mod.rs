//! Data models for Bookshelf

pub mod book;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookDocument, BookFields, CategoryCount};
pub use user::{NewUser, Role, User, UserDocument, UserFields};
