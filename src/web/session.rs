//! Cookie session, request identity and flash messages
//!
//! Both cookies live in a [`PrivateCookieJar`], so their contents are
//! encrypted and authenticated with the process cookie key.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use crate::{
    error::{AppError, AppResult},
    models::{Role, User},
    repository::StoreError,
    AppState,
};

pub const SESSION_COOKIE: &str = "session";
pub const FLASH_COOKIE: &str = "flash";

fn cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Remember `user` for subsequent requests
pub fn start(jar: PrivateCookieJar, user: &User) -> PrivateCookieJar {
    jar.add(cookie(SESSION_COOKIE, user.id.clone()))
}

pub fn end(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// The caller's account, if the session cookie resolves to one.
///
/// A missing cookie, a malformed identifier and a deleted account all yield
/// `Identity(None)`.
#[derive(Debug, Clone)]
pub struct Identity(pub Option<User>);

impl Identity {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    /// Gate for handlers reserved to `required` (an admin satisfies every role)
    pub fn require(&self, required: Role) -> AppResult<&User> {
        match self.user() {
            Some(user) if user.role == required || user.is_admin() => Ok(user),
            Some(user) => {
                tracing::warn!(user_id = %user.id, required = %required, "Access denied");
                Err(AppError::Forbidden)
            }
            None => Err(AppError::Forbidden),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state).await?;
        let Some(session) = jar.get(SESSION_COOKIE) else {
            return Ok(Identity(None));
        };

        match state.services.users.get_user(session.value()).await {
            Ok(user) => Ok(Identity(Some(user))),
            Err(AppError::Store(StoreError::Backend(e))) => {
                tracing::warn!("Could not load session user: {}", e);
                Ok(Identity(None))
            }
            Err(_) => Ok(Identity(None)),
        }
    }
}

/// Extractor for handlers that need a logged-in caller; anonymous callers
/// are sent to the login page.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = match Identity::from_request_parts(parts, state).await {
            Ok(Identity(user)) => user,
            Err(never) => match never {},
        };
        user.map(CurrentUser).ok_or_else(|| Redirect::to("/login"))
    }
}

/// Extractor for the admin screens.
///
/// Resolves before any body extractor runs, so callers without the admin
/// role get a 403 whatever they post.
pub struct AdminUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let identity = match Identity::from_request_parts(parts, state).await {
            Ok(identity) => identity,
            Err(never) => match never {},
        };
        identity.require(Role::Admin)?;
        Ok(AdminUser(identity))
    }
}

/// One-shot status message shown on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    /// Presentation class, `success` or `danger`
    pub category: String,
    pub message: String,
}

fn read_flashes(jar: &PrivateCookieJar) -> Vec<FlashMessage> {
    jar.get(FLASH_COOKIE)
        .and_then(|c| serde_json::from_str(c.value()).ok())
        .unwrap_or_default()
}

/// Queue a message for the next page render
pub fn flash(jar: PrivateCookieJar, category: &str, message: &str) -> PrivateCookieJar {
    let mut messages = read_flashes(&jar);
    messages.push(FlashMessage {
        category: category.to_string(),
        message: message.to_string(),
    });
    match serde_json::to_string(&messages) {
        Ok(value) => jar.add(cookie(FLASH_COOKIE, value)),
        Err(e) => {
            tracing::error!("Failed to encode flash messages: {}", e);
            jar
        }
    }
}

/// Drain queued messages
pub fn take_flashes(jar: PrivateCookieJar) -> (PrivateCookieJar, Vec<FlashMessage>) {
    let messages = read_flashes(&jar);
    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, messages);
    }
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), messages)
}
