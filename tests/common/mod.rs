//! Shared harness: the full router over a seeded in-memory store, with a
//! tiny cookie jar so requests behave like a browser session.

#![allow(dead_code)]

use std::collections::HashMap;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use axum_extra::extract::cookie::Key;
use tower::ServiceExt;

use bookshelf_server::{
    config::AppConfig, models::Book, repository::Repository, services::seed, web, AppState,
};

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

pub struct TestApp {
    router: Router,
    pub repository: Repository,
    cookies: HashMap<String, String>,
}

impl TestApp {
    pub async fn seeded() -> Self {
        let repository = Repository::in_memory();
        seed::populate(&repository).await.expect("seeding failed");
        let state = AppState::new(AppConfig::default(), repository.clone(), Key::generate());

        Self {
            router: web::router(state),
            repository,
            cookies: HashMap::new(),
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, form: &str) -> TestResponse {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// POST with no body and no content type
    pub async fn post_empty(&mut self, uri: &str) -> TestResponse {
        let request = Request::post(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        let form = format!("email={}&password={}", email.replace('@', "%40"), password);
        self.post_form("/login", &form).await
    }

    pub fn forget_cookies(&mut self) {
        self.cookies.clear();
    }

    pub async fn book_by_title(&self, title: &str) -> Book {
        self.repository
            .books
            .list()
            .await
            .unwrap()
            .into_iter()
            .find(|b| b.title == title)
            .unwrap_or_else(|| panic!("no book titled {title}"))
    }

    async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();

        for set_cookie in response.headers().get_all(header::SET_COOKIE) {
            let raw = set_cookie.to_str().unwrap();
            let pair = raw.split(';').next().unwrap_or_default();
            if let Some((name, value)) = pair.split_once('=') {
                if value.is_empty() {
                    self.cookies.remove(name);
                } else {
                    self.cookies.insert(name.to_string(), value.to_string());
                }
            }
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}
