//! Demo dataset used by the `seed` binary

use bson::oid::ObjectId;
use chrono::{TimeZone, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{BookDocument, NewUser, Role},
    repository::Repository,
};

use super::users::hash_password;

/// What a seeding run inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub books: usize,
}

const USERS: [(&str, &str, &str, Role); 3] = [
    ("John Doe", "john@example.com", "password123", Role::User),
    ("Jane Smith", "jane@example.com", "securepass", Role::User),
    ("Admin User", "admin@example.com", "adminpass", Role::Admin),
];

/// (title, author, category, description, year, borrower indexes into USERS)
const BOOKS: [(&str, &str, &str, &str, i32, &[usize]); 6] = [
    (
        "The Python Handbook",
        "Flavio Copes",
        "Programming",
        "Learn Python programming basics quickly with this comprehensive guide.",
        2020,
        &[],
    ),
    (
        "Fluent Python",
        "Luciano Ramalho",
        "Programming",
        "Learn how to write effective Python code using Python's best features.",
        2021,
        &[0],
    ),
    (
        "The Great Gatsby",
        "F. Scott Fitzgerald",
        "Classic Literature",
        "A story of the fabulously wealthy Jay Gatsby and his love for Daisy Buchanan.",
        2022,
        &[],
    ),
    (
        "1984",
        "George Orwell",
        "Dystopian",
        "A dystopian social science fiction novel and cautionary tale.",
        2023,
        &[1],
    ),
    (
        "Sapiens: A Brief History of Humankind",
        "Yuval Noah Harari",
        "History",
        "Explore the history of humankind from the evolution of Homo sapiens.",
        2024,
        &[],
    ),
    (
        "The Lean Startup",
        "Eric Ries",
        "Business",
        "Learn how to create and manage successful startups.",
        2025,
        &[0, 2],
    ),
];

/// Wipe both collections and insert the demo users and books
pub async fn populate(repository: &Repository) -> AppResult<SeedReport> {
    repository.users.clear().await?;
    repository.books.clear().await?;

    let mut user_ids = Vec::with_capacity(USERS.len());
    for (name, email, password, role) in USERS {
        let user = NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            role,
        };
        user_ids.push(repository.users.insert(&user).await?);
    }

    for (title, author, category, description, year, borrowers) in BOOKS {
        let published = Utc
            .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| AppError::Internal(format!("Invalid seed year {}", year)))?;
        let borrowed_by: Vec<String> = borrowers
            .iter()
            .filter_map(|&i| user_ids.get(i).cloned())
            .collect();

        let book = BookDocument {
            id: ObjectId::new(),
            title: title.to_string(),
            author: author.to_string(),
            category: category.to_string(),
            description: Some(description.to_string()),
            published_date: Some(bson::DateTime::from_chrono(published)),
            borrowed_by: Some(borrowed_by),
        };
        repository.books.insert_document(book).await?;
    }

    Ok(SeedReport {
        users: USERS.len(),
        books: BOOKS.len(),
    })
}
