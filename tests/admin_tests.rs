//! Administration screens: access control and book/user management

mod common;

use axum::http::StatusCode;
use common::TestApp;

/// Every admin route, paired with whether it also takes a form POST
fn admin_routes(book_id: &str, user_id: &str) -> Vec<(String, bool)> {
    vec![
        ("/admin/dashboard".to_string(), false),
        ("/admin/users".to_string(), false),
        ("/admin/books".to_string(), false),
        ("/admin/books/add".to_string(), true),
        (format!("/admin/books/edit/{book_id}"), true),
        (format!("/admin/books/delete/{book_id}"), false),
        (format!("/admin/users/edit/{user_id}"), true),
        (format!("/admin/users/delete/{user_id}"), false),
    ]
}

async fn assert_locked_out(app: &mut TestApp) {
    let book = app.book_by_title("1984").await;
    let jane = app
        .repository
        .users
        .find_by_email("jane@example.com")
        .await
        .unwrap()
        .unwrap();

    for (uri, takes_form) in admin_routes(&book.id, &jane.id) {
        let response = app.get(&uri).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "GET {uri}");

        if takes_form {
            // no body and no content type: the role check must still come first
            let response = app.post_empty(&uri).await;
            assert_eq!(response.status, StatusCode::FORBIDDEN, "POST {uri}");
        }
    }

    assert_eq!(app.repository.books.count().await.unwrap(), 6);
    assert_eq!(app.repository.users.count().await.unwrap(), 3);
    assert!(!app.repository.users.get(&jane.id).await.unwrap().is_admin());
}

#[tokio::test]
async fn test_anonymous_is_forbidden_everywhere() {
    let mut app = TestApp::seeded().await;
    assert_locked_out(&mut app).await;
}

#[tokio::test]
async fn test_regular_user_is_forbidden_everywhere() {
    let mut app = TestApp::seeded().await;
    app.login("john@example.com", "password123").await;
    assert_locked_out(&mut app).await;
}

#[tokio::test]
async fn test_regular_user_cannot_mutate() {
    let mut app = TestApp::seeded().await;
    app.login("john@example.com", "password123").await;
    let book = app.book_by_title("1984").await;
    let jane = app
        .repository
        .users
        .find_by_email("jane@example.com")
        .await
        .unwrap()
        .unwrap();

    let response = app.get(&format!("/admin/books/delete/{}", book.id)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .post_form("/admin/books/add", "title=Spam&author=Spam&category=Spam")
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .post_form(
            &format!("/admin/users/edit/{}", jane.id),
            "name=Jane&email=jane%40example.com&role=admin",
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.get(&format!("/admin/users/delete/{}", jane.id)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    assert_eq!(app.repository.books.count().await.unwrap(), 6);
    assert_eq!(app.repository.users.count().await.unwrap(), 3);
    let jane = app.repository.users.get(&jane.id).await.unwrap();
    assert!(!jane.is_admin());
}

#[tokio::test]
async fn test_admin_lists_books_and_users() {
    let mut app = TestApp::seeded().await;
    app.login("admin@example.com", "adminpass").await;

    let response = app.get("/admin/books").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("The Great Gatsby"));
    assert!(response.body.contains("Eric Ries"));

    let response = app.get("/admin/users").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("jane@example.com"));
    assert!(!response.body.contains("$argon2"));
}

#[tokio::test]
async fn test_admin_adds_book() {
    let mut app = TestApp::seeded().await;
    app.login("admin@example.com", "adminpass").await;

    let response = app
        .post_form(
            "/admin/books/add",
            "title=Dune&author=Frank+Herbert&category=Science+Fiction&description=Desert+planet",
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/admin/books"));

    let response = app.get("/admin/books").await;
    assert!(response.body.contains("Book added successfully"));
    assert!(response.body.contains("Dune"));

    let dune = app.book_by_title("Dune").await;
    assert_eq!(dune.author, "Frank Herbert");
    assert_eq!(dune.category, "Science Fiction");
    assert!(dune.borrowed_by.is_empty());
    assert!(dune.published_date.is_some());

    let response = app.get("/books/Science%20Fiction").await;
    assert!(response.body.contains("Dune"));
}

#[tokio::test]
async fn test_admin_edits_book_keeping_borrowers() {
    let mut app = TestApp::seeded().await;
    app.login("admin@example.com", "adminpass").await;
    let book = app.book_by_title("The Lean Startup").await;

    let response = app.get(&format!("/admin/books/edit/{}", book.id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Eric Ries"));

    let response = app
        .post_form(
            &format!("/admin/books/edit/{}", book.id),
            "title=The+Lean+Startup+%282nd+ed.%29&author=Eric+Ries&category=Business&description=Revised",
        )
        .await;
    assert_eq!(response.location.as_deref(), Some("/admin/books"));

    let edited = app.repository.books.get(&book.id).await.unwrap();
    assert_eq!(edited.title, "The Lean Startup (2nd ed.)");
    assert_eq!(edited.description, "Revised");
    assert_eq!(edited.borrowed_by, book.borrowed_by);
    assert_eq!(edited.published_date, book.published_date);

    let response = app.get("/admin/books").await;
    assert!(response.body.contains("Book updated successfully"));
}

#[tokio::test]
async fn test_admin_edit_of_missing_book() {
    let mut app = TestApp::seeded().await;
    app.login("admin@example.com", "adminpass").await;

    let response = app.get("/admin/books/edit/0123456789abcdef01234567").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .post_form(
            "/admin/books/edit/0123456789abcdef01234567",
            "title=X&author=Y&category=Z",
        )
        .await;
    assert_eq!(response.location.as_deref(), Some("/admin/books"));

    let response = app.get("/admin/books").await;
    assert!(response.body.contains("Error updating book"));
}

#[tokio::test]
async fn test_admin_deletes_book() {
    let mut app = TestApp::seeded().await;
    app.login("admin@example.com", "adminpass").await;
    let book = app.book_by_title("1984").await;

    let response = app.get(&format!("/admin/books/delete/{}", book.id)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/admin/books"));
    assert_eq!(app.repository.books.count().await.unwrap(), 5);

    let response = app.get(&format!("/book/{}", book.id)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.get(&format!("/admin/books/delete/{}", book.id)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let response = app.get("/admin/books").await;
    assert!(response.body.contains("Error deleting book"));
}

#[tokio::test]
async fn test_admin_promotes_user() {
    let mut app = TestApp::seeded().await;
    app.login("admin@example.com", "adminpass").await;
    let jane = app
        .repository
        .users
        .find_by_email("jane@example.com")
        .await
        .unwrap()
        .unwrap();

    let response = app.get(&format!("/admin/users/edit/{}", jane.id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("jane@example.com"));

    let response = app
        .post_form(
            &format!("/admin/users/edit/{}", jane.id),
            "name=Jane+Smith&email=jane%40example.com&role=admin",
        )
        .await;
    assert_eq!(response.location.as_deref(), Some("/admin/users"));

    let updated = app.repository.users.get(&jane.id).await.unwrap();
    assert!(updated.is_admin());
    assert_eq!(updated.password_hash, jane.password_hash);

    app.forget_cookies();
    let response = app.login("jane@example.com", "securepass").await;
    assert_eq!(response.location.as_deref(), Some("/admin/dashboard"));
}

#[tokio::test]
async fn test_admin_edit_user_rejects_unknown_role() {
    let mut app = TestApp::seeded().await;
    app.login("admin@example.com", "adminpass").await;
    let john = app
        .repository
        .users
        .find_by_email("john@example.com")
        .await
        .unwrap()
        .unwrap();

    let response = app
        .post_form(
            &format!("/admin/users/edit/{}", john.id),
            "name=John&email=john%40example.com&role=superuser",
        )
        .await;
    assert_eq!(response.location.as_deref(), Some("/admin/users"));

    let unchanged = app.repository.users.get(&john.id).await.unwrap();
    assert_eq!(unchanged.name, "John Doe");
    assert!(!unchanged.is_admin());
}

#[tokio::test]
async fn test_admin_deletes_user() {
    let mut app = TestApp::seeded().await;
    app.login("admin@example.com", "adminpass").await;
    let john = app
        .repository
        .users
        .find_by_email("john@example.com")
        .await
        .unwrap()
        .unwrap();

    let response = app.get(&format!("/admin/users/delete/{}", john.id)).await;
    assert_eq!(response.location.as_deref(), Some("/admin/users"));
    assert_eq!(app.repository.users.count().await.unwrap(), 2);

    let response = app.get("/admin/users").await;
    assert!(response.body.contains("User deleted successfully"));
    assert!(!response.body.contains("john@example.com"));
}
