//! Home, about and category index pages

use axum::{extract::State, response::Html};
use axum_extra::extract::cookie::PrivateCookieJar;
use minijinja::context;

use super::{session::Identity, views};
use crate::{error::AppResult, AppState};

pub async fn home(
    State(state): State<AppState>,
    identity: Identity,
    jar: PrivateCookieJar,
) -> AppResult<(PrivateCookieJar, Html<String>)> {
    let catalog = &state.services.catalog;
    let stats = catalog.stats().await?;
    let popular_categories = catalog.popular_categories().await?;
    let recent_books = catalog.recent_books().await?;

    views::page(
        jar,
        &identity,
        "home.html",
        context! { stats, popular_categories, recent_books },
    )
}

pub async fn about(
    State(state): State<AppState>,
    identity: Identity,
    jar: PrivateCookieJar,
) -> AppResult<(PrivateCookieJar, Html<String>)> {
    let stats = state.services.catalog.stats().await?;
    views::page(jar, &identity, "about.html", context! { stats })
}

pub async fn categories(
    State(state): State<AppState>,
    identity: Identity,
    jar: PrivateCookieJar,
) -> AppResult<(PrivateCookieJar, Html<String>)> {
    let categories = state.services.catalog.categories().await?;
    views::page(jar, &identity, "categories.html", context! { categories })
}
