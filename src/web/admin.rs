//! Administration screens for books and users
//!
//! Every handler takes an [`AdminUser`] ahead of its other extractors, so
//! callers without the admin role are turned away before the request body
//! is read or the store is touched.

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use minijinja::context;
use serde::Deserialize;

use super::{
    session::{self, AdminUser},
    views,
};
use crate::{
    error::AppResult,
    models::BookFields,
    AppState,
};

type Page = AppResult<(PrivateCookieJar, Html<String>)>;
type Outcome = AppResult<(PrivateCookieJar, Redirect)>;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub role: String,
}

fn done(jar: PrivateCookieJar, category: &str, message: &str, to: &str) -> Outcome {
    Ok((session::flash(jar, category, message), Redirect::to(to)))
}

pub async fn dashboard(State(state): State<AppState>, AdminUser(identity): AdminUser, jar: PrivateCookieJar) -> Page {
    let stats = state.services.catalog.stats().await?;
    views::page(jar, &identity, "admin/dashboard.html", context! { stats })
}

pub async fn users(State(state): State<AppState>, AdminUser(identity): AdminUser, jar: PrivateCookieJar) -> Page {
    let users = state.services.users.list_users().await?;
    views::page(jar, &identity, "admin/users.html", context! { users })
}

pub async fn books(State(state): State<AppState>, AdminUser(identity): AdminUser, jar: PrivateCookieJar) -> Page {
    let books = state.services.catalog.list_books().await?;
    views::page(jar, &identity, "admin/books.html", context! { books })
}

pub async fn add_book_form(AdminUser(identity): AdminUser, jar: PrivateCookieJar) -> Page {
    views::page(jar, &identity, "admin/add_book.html", context! {})
}

pub async fn add_book(
    State(state): State<AppState>,
    _admin: AdminUser,
    jar: PrivateCookieJar,
    Form(fields): Form<BookFields>,
) -> Outcome {
    match state.services.catalog.add_book(&fields).await {
        Ok(_) => done(jar, "success", "Book added successfully", "/admin/books"),
        Err(e) => {
            tracing::warn!("Adding book failed: {}", e);
            done(jar, "danger", "Error adding book", "/admin/books")
        }
    }
}

pub async fn edit_book_form(
    State(state): State<AppState>,
    AdminUser(identity): AdminUser,
    jar: PrivateCookieJar,
    Path(book_id): Path<String>,
) -> Page {
    let book = state.services.catalog.get_book(&book_id).await?;
    views::page(jar, &identity, "admin/edit_book.html", context! { book })
}

pub async fn edit_book(
    State(state): State<AppState>,
    _admin: AdminUser,
    jar: PrivateCookieJar,
    Path(book_id): Path<String>,
    Form(fields): Form<BookFields>,
) -> Outcome {
    match state.services.catalog.update_book(&book_id, &fields).await {
        Ok(()) => done(jar, "success", "Book updated successfully", "/admin/books"),
        Err(e) => {
            tracing::warn!(book_id = %book_id, "Updating book failed: {}", e);
            done(jar, "danger", "Error updating book", "/admin/books")
        }
    }
}

pub async fn delete_book(
    State(state): State<AppState>,
    _admin: AdminUser,
    jar: PrivateCookieJar,
    Path(book_id): Path<String>,
) -> Outcome {
    match state.services.catalog.delete_book(&book_id).await {
        Ok(()) => done(jar, "success", "Book deleted successfully", "/admin/books"),
        Err(e) => {
            tracing::warn!(book_id = %book_id, "Deleting book failed: {}", e);
            done(jar, "danger", "Error deleting book", "/admin/books")
        }
    }
}

pub async fn edit_user_form(
    State(state): State<AppState>,
    AdminUser(identity): AdminUser,
    jar: PrivateCookieJar,
    Path(user_id): Path<String>,
) -> Page {
    let user = state.services.users.get_user(&user_id).await?;
    views::page(jar, &identity, "admin/edit_user.html", context! { user })
}

pub async fn edit_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    jar: PrivateCookieJar,
    Path(user_id): Path<String>,
    Form(form): Form<UserForm>,
) -> Outcome {
    let result = state
        .services
        .users
        .update_user(&user_id, form.name.trim(), form.email.trim(), &form.role)
        .await;

    match result {
        Ok(()) => done(jar, "success", "User updated successfully", "/admin/users"),
        Err(e) => {
            tracing::warn!(user_id = %user_id, "Updating user failed: {}", e);
            let message = e.flash_text().unwrap_or("Error updating user");
            done(jar, "danger", message, "/admin/users")
        }
    }
}

pub async fn delete_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    jar: PrivateCookieJar,
    Path(user_id): Path<String>,
) -> Outcome {
    match state.services.users.delete_user(&user_id).await {
        Ok(()) => done(jar, "success", "User deleted successfully", "/admin/users"),
        Err(e) => {
            tracing::warn!(user_id = %user_id, "Deleting user failed: {}", e);
            done(jar, "danger", "Error deleting user", "/admin/users")
        }
    }
}
