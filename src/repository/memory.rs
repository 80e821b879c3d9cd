//! Process-local document store
//!
//! Mirrors the MongoDB repositories closely enough to run the whole
//! application without a database: documents keep insertion order,
//! borrower updates behave like `$addToSet` / `$pull`, and identifiers are
//! real ObjectIds so malformed ids fail the same way.

use std::collections::BTreeMap;

use async_trait::async_trait;
use regex::RegexBuilder;
use tokio::sync::RwLock;

use crate::models::{Book, BookDocument, BookFields, CategoryCount, NewUser, User, UserDocument, UserFields};

use super::{parse_id, BookQuery, BookStore, StoreError, StoreResult, UserStore};

fn missing(collection: &'static str, id: &str) -> StoreError {
    StoreError::Missing {
        collection,
        id: id.to_string(),
    }
}

#[derive(Default)]
pub struct MemoryBooks {
    books: RwLock<Vec<BookDocument>>,
}

impl MemoryBooks {
    /// Apply `change` to the book with the given id
    async fn modify<F>(&self, id: &str, change: F) -> StoreResult<()>
    where
        F: FnOnce(&mut BookDocument) + Send,
    {
        let oid = parse_id(id)?;
        let mut books = self.books.write().await;
        let book = books
            .iter_mut()
            .find(|b| b.id == oid)
            .ok_or_else(|| missing("books", id))?;
        change(book);
        Ok(())
    }
}

#[async_trait]
impl BookStore for MemoryBooks {
    async fn count(&self) -> StoreResult<u64> {
        Ok(self.books.read().await.len() as u64)
    }

    async fn category_counts(&self) -> StoreResult<Vec<CategoryCount>> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for book in self.books.read().await.iter() {
            *counts.entry(book.category.clone()).or_default() += 1;
        }

        let mut categories: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(name, count)| CategoryCount { name, count })
            .collect();
        // Stable sort keeps ties in name order, like the aggregation's secondary key
        categories.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(categories)
    }

    async fn recent(&self, limit: u64) -> StoreResult<Vec<Book>> {
        let books = self.books.read().await;
        Ok(books
            .iter()
            .rev()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .map(Book::from)
            .collect())
    }

    async fn search(&self, query: &BookQuery) -> StoreResult<(Vec<Book>, u64)> {
        let matcher = match query.search.as_deref().filter(|s| !s.is_empty()) {
            Some(search) => Some(
                RegexBuilder::new(&regex::escape(search))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| StoreError::Backend(e.to_string()))?,
            ),
            None => None,
        };

        let books = self.books.read().await;
        let matching: Vec<&BookDocument> = books
            .iter()
            .filter(|b| b.category == query.category)
            .filter(|b| {
                matcher
                    .as_ref()
                    .map_or(true, |re| re.is_match(&b.title) || re.is_match(&b.author))
            })
            .collect();

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(usize::try_from(query.skip).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .cloned()
            .map(Book::from)
            .collect();

        Ok((page, total))
    }

    async fn list(&self) -> StoreResult<Vec<Book>> {
        Ok(self.books.read().await.iter().cloned().map(Book::from).collect())
    }

    async fn get(&self, id: &str) -> StoreResult<Book> {
        let oid = parse_id(id)?;
        self.books
            .read()
            .await
            .iter()
            .find(|b| b.id == oid)
            .cloned()
            .map(Book::from)
            .ok_or_else(|| missing("books", id))
    }

    async fn insert(&self, fields: &BookFields) -> StoreResult<String> {
        self.insert_document(BookDocument::from_fields(fields)).await
    }

    async fn update(&self, id: &str, fields: &BookFields) -> StoreResult<()> {
        let fields = fields.clone();
        self.modify(id, move |book| {
            book.title = fields.title;
            book.author = fields.author;
            book.category = fields.category;
            book.description = Some(fields.description);
        })
        .await
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let oid = parse_id(id)?;
        let mut books = self.books.write().await;
        let before = books.len();
        books.retain(|b| b.id != oid);
        if books.len() == before {
            return Err(missing("books", id));
        }
        Ok(())
    }

    async fn add_borrower(&self, id: &str, user_id: &str) -> StoreResult<()> {
        self.modify(id, |book| {
            let borrowers = book.borrowed_by.get_or_insert_with(Vec::new);
            if !borrowers.iter().any(|b| b == user_id) {
                borrowers.push(user_id.to_string());
            }
        })
        .await
    }

    async fn remove_borrower(&self, id: &str, user_id: &str) -> StoreResult<()> {
        self.modify(id, |book| {
            if let Some(borrowers) = book.borrowed_by.as_mut() {
                borrowers.retain(|b| b != user_id);
            }
        })
        .await
    }

    async fn insert_document(&self, book: BookDocument) -> StoreResult<String> {
        let id = book.id.to_hex();
        self.books.write().await.push(book);
        Ok(id)
    }

    async fn clear(&self) -> StoreResult<()> {
        self.books.write().await.clear();
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUsers {
    users: RwLock<Vec<UserDocument>>,
}

#[async_trait]
impl UserStore for MemoryUsers {
    async fn count(&self) -> StoreResult<u64> {
        Ok(self.users.read().await.len() as u64)
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        Ok(self.users.read().await.iter().cloned().map(User::from).collect())
    }

    async fn get(&self, id: &str) -> StoreResult<User> {
        let oid = parse_id(id)?;
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.id == oid)
            .cloned()
            .map(User::from)
            .ok_or_else(|| missing("users", id))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .map(User::from))
    }

    async fn insert(&self, user: &NewUser) -> StoreResult<String> {
        let document = UserDocument::from_new(user);
        let id = document.id.to_hex();
        self.users.write().await.push(document);
        Ok(id)
    }

    async fn update(&self, id: &str, fields: &UserFields) -> StoreResult<()> {
        let oid = parse_id(id)?;
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.id == oid)
            .ok_or_else(|| missing("users", id))?;
        user.name = Some(fields.name.clone());
        user.email = fields.email.clone();
        user.role = Some(fields.role.as_str().to_string());
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let oid = parse_id(id)?;
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != oid);
        if users.len() == before {
            return Err(missing("users", id));
        }
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        self.users.write().await.clear();
        Ok(())
    }
}
