//! HTML routes for Bookshelf

pub mod admin;
pub mod auth;
pub mod books;
pub mod pages;
pub mod session;
pub mod views;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/users", get(admin::users))
        .route("/users/edit/:user_id", get(admin::edit_user_form).post(admin::edit_user))
        .route("/users/delete/:user_id", get(admin::delete_user))
        .route("/books", get(admin::books))
        .route("/books/add", get(admin::add_book_form).post(admin::add_book))
        .route("/books/edit/:book_id", get(admin::edit_book_form).post(admin::edit_book))
        .route("/books/delete/:book_id", get(admin::delete_book));

    Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/categories", get(pages::categories))
        .route("/books/:category", get(books::list_books))
        .route("/book/:book_id", get(books::book_detail))
        .route("/borrow/:book_id", get(books::borrow_book))
        .route("/return/:book_id", get(books::return_book))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/logout", get(auth::logout))
        .nest("/admin", admin)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
