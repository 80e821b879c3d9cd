//! Catalog browsing, borrowing and book administration

use serde::Serialize;

use crate::{
    error::AppResult,
    models::{Book, BookFields, CategoryCount, User},
    repository::{BookQuery, Repository},
};

/// Books per page in category listings
pub const PAGE_SIZE: u64 = 6;

/// Number of entries in the home page "popular" and "recent" panels
const HIGHLIGHTS: usize = 5;

/// Page count shown under a listing.
///
/// Always one more than the number of full pages, so an exact multiple of
/// `per_page` advertises a trailing empty page (6 books at 6 per page gives 2).
pub fn page_count(total: u64, per_page: u64) -> u64 {
    total / per_page.max(1) + 1
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Stats {
    pub total_books: u64,
    pub total_categories: u64,
    pub total_users: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub count: u64,
    pub description: String,
}

impl From<CategoryCount> for CategorySummary {
    fn from(category: CategoryCount) -> Self {
        Self {
            description: format!("Explore our collection of {} books", category.count),
            name: category.name,
            count: category.count,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub pages: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookPage {
    pub books: Vec<Book>,
    pub pagination: Pagination,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Totals shown on the home and about pages
    pub async fn stats(&self) -> AppResult<Stats> {
        let total_books = self.repository.books.count().await?;
        let total_categories = self.repository.books.category_counts().await?.len() as u64;
        let total_users = self.repository.users.count().await?;

        Ok(Stats {
            total_books,
            total_categories,
            total_users,
        })
    }

    pub async fn popular_categories(&self) -> AppResult<Vec<CategoryCount>> {
        let mut categories = self.repository.books.category_counts().await?;
        categories.truncate(HIGHLIGHTS);
        Ok(categories)
    }

    pub async fn recent_books(&self) -> AppResult<Vec<Book>> {
        Ok(self.repository.books.recent(HIGHLIGHTS as u64).await?)
    }

    pub async fn categories(&self) -> AppResult<Vec<CategorySummary>> {
        let mut categories = self.repository.books.category_counts().await?;
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories.into_iter().map(CategorySummary::from).collect())
    }

    /// One page of a category, optionally narrowed by a title/author search
    pub async fn browse(&self, category: &str, search: &str, page: u64) -> AppResult<BookPage> {
        let page = page.max(1);
        let query = BookQuery {
            category: category.to_string(),
            search: Some(search.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            skip: (page - 1).saturating_mul(PAGE_SIZE),
            limit: PAGE_SIZE,
        };

        let (books, total) = self.repository.books.search(&query).await?;

        Ok(BookPage {
            books,
            pagination: Pagination {
                page,
                per_page: PAGE_SIZE,
                total,
                pages: page_count(total, PAGE_SIZE),
            },
        })
    }

    pub async fn get_book(&self, id: &str) -> AppResult<Book> {
        Ok(self.repository.books.get(id).await?)
    }

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        Ok(self.repository.books.list().await?)
    }

    /// Record `user` as a borrower; borrowing twice keeps a single entry
    pub async fn borrow(&self, book_id: &str, user: &User) -> AppResult<()> {
        self.repository.books.add_borrower(book_id, &user.id).await?;
        tracing::info!(book_id, user_id = %user.id, "Book borrowed");
        Ok(())
    }

    pub async fn return_book(&self, book_id: &str, user: &User) -> AppResult<()> {
        self.repository.books.remove_borrower(book_id, &user.id).await?;
        tracing::info!(book_id, user_id = %user.id, "Book returned");
        Ok(())
    }

    pub async fn add_book(&self, fields: &BookFields) -> AppResult<String> {
        let id = self.repository.books.insert(fields).await?;
        tracing::info!(book_id = %id, title = %fields.title, "Book added");
        Ok(id)
    }

    pub async fn update_book(&self, id: &str, fields: &BookFields) -> AppResult<()> {
        self.repository.books.update(id, fields).await?;
        tracing::info!(book_id = id, "Book updated");
        Ok(())
    }

    pub async fn delete_book(&self, id: &str) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        error::AppError,
        models::Role,
        repository::{memory::MemoryUsers, MockBookStore, StoreError},
    };

    fn reader() -> User {
        User {
            id: "65a1b2c3d4e5f60718293a4b".into(),
            name: "John Doe".into(),
            email: "john@example.com".into(),
            password_hash: String::new(),
            role: Role::User,
        }
    }

    #[test]
    fn test_page_count_keeps_trailing_page() {
        assert_eq!(page_count(0, 6), 1);
        assert_eq!(page_count(5, 6), 1);
        assert_eq!(page_count(6, 6), 2);
        assert_eq!(page_count(7, 6), 2);
        assert_eq!(page_count(12, 6), 3);
    }

    #[test]
    fn test_category_summary_description() {
        let summary = CategorySummary::from(CategoryCount {
            name: "History".into(),
            count: 3,
        });
        assert_eq!(summary.description, "Explore our collection of 3 books");
    }

    #[tokio::test]
    async fn test_browse_builds_query_from_page_and_search() {
        let mut books = MockBookStore::new();
        books
            .expect_search()
            .withf(|q| {
                q.category == "Programming"
                    && q.search.as_deref() == Some("python")
                    && q.skip == 6
                    && q.limit == PAGE_SIZE
            })
            .returning(|_| Ok((Vec::new(), 6)));

        let service = CatalogService::new(Repository::new(Arc::new(books), Arc::new(MemoryUsers::default())));
        let page = service.browse("Programming", " python ", 2).await.unwrap();

        assert_eq!(
            page.pagination,
            Pagination {
                page: 2,
                per_page: 6,
                total: 6,
                pages: 2
            }
        );
    }

    #[tokio::test]
    async fn test_browse_clamps_page_and_drops_blank_search() {
        let mut books = MockBookStore::new();
        books
            .expect_search()
            .withf(|q| q.search.is_none() && q.skip == 0)
            .returning(|_| Ok((Vec::new(), 0)));

        let service = CatalogService::new(Repository::new(Arc::new(books), Arc::new(MemoryUsers::default())));
        let page = service.browse("History", "   ", 0).await.unwrap();
        assert_eq!(page.pagination.page, 1);
        assert_eq!(page.pagination.pages, 1);
    }

    #[tokio::test]
    async fn test_browse_far_past_the_end_saturates_skip() {
        let mut books = MockBookStore::new();
        books
            .expect_search()
            .withf(|q| q.skip == u64::MAX)
            .returning(|_| Ok((Vec::new(), 2)));

        let service = CatalogService::new(Repository::new(Arc::new(books), Arc::new(MemoryUsers::default())));
        let page = service.browse("Programming", "", u64::MAX).await.unwrap();
        assert_eq!(page.pagination.page, u64::MAX);
        assert!(page.books.is_empty());
    }

    #[tokio::test]
    async fn test_borrow_surfaces_store_failures() {
        let mut books = MockBookStore::new();
        books
            .expect_add_borrower()
            .returning(|_, _| Err(StoreError::Backend("connection reset".into())));

        let service = CatalogService::new(Repository::new(Arc::new(books), Arc::new(MemoryUsers::default())));
        let result = service.borrow("65a1b2c3d4e5f60718293a4c", &reader()).await;
        assert!(matches!(result, Err(AppError::Store(StoreError::Backend(_)))));
    }
}
