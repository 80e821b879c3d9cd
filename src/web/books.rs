//! Category listings, book details and borrowing

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use minijinja::context;
use serde::Deserialize;

use super::{
    session::{self, CurrentUser, Identity},
    views,
};
use crate::{error::AppResult, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    /// Kept as text so a bad value falls back to the first page
    pub page: Option<String>,
    pub search: Option<String>,
}

impl ListingParams {
    pub fn page(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(1)
    }
}

/// Where to send the caller back after a borrow or return
fn detail_path(book_id: &str) -> String {
    if !book_id.is_empty() && book_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        format!("/book/{}", book_id)
    } else {
        "/categories".to_string()
    }
}

pub async fn list_books(
    State(state): State<AppState>,
    identity: Identity,
    jar: PrivateCookieJar,
    Path(category): Path<String>,
    Query(params): Query<ListingParams>,
) -> AppResult<(PrivateCookieJar, Html<String>)> {
    let search_query = params.search.clone().unwrap_or_default();
    let listing = state
        .services
        .catalog
        .browse(&category, &search_query, params.page())
        .await?;

    views::page(
        jar,
        &identity,
        "books.html",
        context! {
            books => listing.books,
            pagination => listing.pagination,
            category,
            search_query,
        },
    )
}

pub async fn book_detail(
    State(state): State<AppState>,
    identity: Identity,
    jar: PrivateCookieJar,
    Path(book_id): Path<String>,
) -> AppResult<(PrivateCookieJar, Html<String>)> {
    let book = state.services.catalog.get_book(&book_id).await?;
    let borrowed_by_me = identity.user().is_some_and(|u| book.is_borrowed_by(&u.id));
    let borrower_count = book.borrowed_by.len();

    views::page(
        jar,
        &identity,
        "book_detail.html",
        context! { book, borrowed_by_me, borrower_count },
    )
}

pub async fn borrow_book(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: PrivateCookieJar,
    Path(book_id): Path<String>,
) -> (PrivateCookieJar, Redirect) {
    let jar = match state.services.catalog.borrow(&book_id, &user).await {
        Ok(()) => jar,
        Err(e) => {
            tracing::warn!(book_id = %book_id, "Borrow failed: {}", e);
            session::flash(jar, "danger", "Error borrowing book")
        }
    };
    (jar, Redirect::to(&detail_path(&book_id)))
}

pub async fn return_book(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: PrivateCookieJar,
    Path(book_id): Path<String>,
) -> (PrivateCookieJar, Redirect) {
    let jar = match state.services.catalog.return_book(&book_id, &user).await {
        Ok(()) => jar,
        Err(e) => {
            tracing::warn!(book_id = %book_id, "Return failed: {}", e);
            session::flash(jar, "danger", "Error returning book")
        }
    };
    (jar, Redirect::to(&detail_path(&book_id)))
}
