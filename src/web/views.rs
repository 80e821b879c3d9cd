//! HTML rendering
//!
//! Templates are compiled into the binary and loaded on first use by a
//! single shared [`Environment`]. Names ending in `.html` are auto-escaped.

use axum::{http::StatusCode, response::Html};
use axum_extra::extract::cookie::PrivateCookieJar;
use chrono::DateTime;
use minijinja::{context, Environment, Value};
use once_cell::sync::Lazy;

use super::session::{self, Identity};
use crate::error::AppResult;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("error.html", include_str!("../../templates/error.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("about.html", include_str!("../../templates/about.html")),
    ("categories.html", include_str!("../../templates/categories.html")),
    ("books.html", include_str!("../../templates/books.html")),
    ("book_detail.html", include_str!("../../templates/book_detail.html")),
    ("login.html", include_str!("../../templates/login.html")),
    ("register.html", include_str!("../../templates/register.html")),
    ("admin/dashboard.html", include_str!("../../templates/admin/dashboard.html")),
    ("admin/users.html", include_str!("../../templates/admin/users.html")),
    ("admin/books.html", include_str!("../../templates/admin/books.html")),
    ("admin/add_book.html", include_str!("../../templates/admin/add_book.html")),
    ("admin/edit_book.html", include_str!("../../templates/admin/edit_book.html")),
    ("admin/edit_user.html", include_str!("../../templates/admin/edit_user.html")),
];

static ENVIRONMENT: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.set_loader(|name| {
        Ok(TEMPLATES
            .iter()
            .find(|(template, _)| *template == name)
            .map(|(_, source)| source.to_string()))
    });
    env.add_filter("date_format", date_format);
    env.add_filter("truncate", truncate);
    env
});

/// Format an RFC 3339 timestamp, `%d/%m/%Y` by default. Other values pass through.
fn date_format(value: Value, format: Option<String>) -> String {
    let format = format.as_deref().unwrap_or("%d/%m/%Y");
    match value.as_str().map(DateTime::parse_from_rfc3339) {
        Some(Ok(date)) => date.format(format).to_string(),
        _ if value.is_none() || value.is_undefined() => String::new(),
        _ => value.to_string(),
    }
}

/// Cut `text` to `length` characters (100 by default), marking the cut with `...`
fn truncate(text: String, length: Option<usize>) -> String {
    let length = length.unwrap_or(100);
    if text.chars().count() <= length {
        return text;
    }
    let mut cut: String = text.chars().take(length).collect();
    cut.push_str("...");
    cut
}

pub fn render(template: &str, ctx: Value) -> AppResult<String> {
    Ok(ENVIRONMENT.get_template(template)?.render(ctx)?)
}

/// Render a full page for the caller, consuming any pending flash messages
pub fn page(
    jar: PrivateCookieJar,
    identity: &Identity,
    template: &str,
    ctx: Value,
) -> AppResult<(PrivateCookieJar, Html<String>)> {
    let (jar, messages) = session::take_flashes(jar);
    let body = render(
        template,
        context! {
            current_user => identity.user(),
            messages => messages,
            ..ctx
        },
    )?;
    Ok((jar, Html(body)))
}

pub fn render_error(status: StatusCode, message: &str) -> Result<String, minijinja::Error> {
    ENVIRONMENT.get_template("error.html")?.render(context! {
        status => status.as_u16(),
        reason => status.canonical_reason().unwrap_or("Error"),
        message => message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_format() {
        assert_eq!(date_format(Value::from("2021-01-01T00:00:00Z"), None), "01/01/2021");
        assert_eq!(
            date_format(Value::from("2021-03-04T00:00:00Z"), Some("%Y".into())),
            "2021"
        );
        assert_eq!(date_format(Value::from(()), None), "");
        assert_eq!(date_format(Value::from("yesterday"), None), "yesterday");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short".into(), Some(10)), "short");
        assert_eq!(truncate("exactly ten".into(), Some(11)), "exactly ten");
        assert_eq!(truncate("Sapiens: A Brief History".into(), Some(7)), "Sapiens...");
        assert_eq!(truncate("é".repeat(150), None).chars().count(), 103);
    }

    #[test]
    fn test_every_template_compiles() {
        for (name, _) in TEMPLATES {
            assert!(ENVIRONMENT.get_template(name).is_ok(), "{name} failed to compile");
        }
    }

    #[test]
    fn test_error_page_mentions_status() {
        let body = render_error(StatusCode::FORBIDDEN, "No access").unwrap();
        assert!(body.contains("403"));
        assert!(body.contains("No access"));
    }

    #[test]
    fn test_output_is_escaped() {
        let body = render_error(StatusCode::NOT_FOUND, "<script>").unwrap();
        assert!(!body.contains("<script>"));
        assert!(body.contains("&lt;script&gt;"));
    }
}
