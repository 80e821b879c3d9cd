//! Login, registration and logout

use axum::{
    extract::State,
    response::{Html, Redirect},
    Form,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use minijinja::context;
use serde::Deserialize;

use super::{
    session::{self, CurrentUser, Identity},
    views,
};
use crate::{error::AppResult, services::users::Registration, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl From<RegisterForm> for Registration {
    fn from(form: RegisterForm) -> Self {
        Self {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form.password,
        }
    }
}

pub async fn login_form(
    identity: Identity,
    jar: PrivateCookieJar,
) -> AppResult<(PrivateCookieJar, Html<String>)> {
    views::page(jar, &identity, "login.html", context! {})
}

pub async fn login(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<(PrivateCookieJar, Redirect)> {
    match state.services.users.authenticate(form.email.trim(), &form.password).await {
        Ok(user) => {
            let jar = session::start(jar, &user);
            let jar = session::flash(jar, "success", "Login successful!");
            let landing = if user.is_admin() { "/admin/dashboard" } else { "/" };
            Ok((jar, Redirect::to(landing)))
        }
        Err(e) => match e.flash_text() {
            Some(message) => Ok((session::flash(jar, "danger", message), Redirect::to("/login"))),
            None => Err(e),
        },
    }
}

pub async fn register_form(
    identity: Identity,
    jar: PrivateCookieJar,
) -> AppResult<(PrivateCookieJar, Html<String>)> {
    views::page(jar, &identity, "register.html", context! {})
}

pub async fn register(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> AppResult<(PrivateCookieJar, Redirect)> {
    let registration = Registration::from(form);
    match state.services.users.register(&registration).await {
        Ok(_) => {
            let jar = session::flash(jar, "success", "Registration successful! Please login");
            Ok((jar, Redirect::to("/login")))
        }
        Err(e) => match e.flash_text() {
            Some(message) => Ok((session::flash(jar, "danger", message), Redirect::to("/register"))),
            None => Err(e),
        },
    }
}

pub async fn logout(CurrentUser(user): CurrentUser, jar: PrivateCookieJar) -> (PrivateCookieJar, Redirect) {
    tracing::info!(user_id = %user.id, "User logged out");
    (session::end(jar), Redirect::to("/"))
}
