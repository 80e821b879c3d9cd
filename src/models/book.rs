//! Book model and related types

use bson::{oid::ObjectId, Bson};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Raw `books` document as stored in the document store.
///
/// Every attribute the application does not strictly need is optional so
/// that hand-edited or older records still load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub author: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub published_date: Option<bson::DateTime>,
    #[serde(default, deserialize_with = "borrower_ids")]
    pub borrowed_by: Option<Vec<String>>,
}

/// Borrowers as hex strings. Records written by older tooling hold raw
/// ObjectIds; both forms load, duplicates collapse and anything else is dropped.
fn borrower_ids<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Bson>>::deserialize(deserializer)?;
    Ok(raw.map(|entries| {
        let mut ids: Vec<String> = Vec::with_capacity(entries.len());
        for entry in entries {
            let id = match entry {
                Bson::ObjectId(oid) => oid.to_hex(),
                Bson::String(id) => id,
                _ => continue,
            };
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }))
}

impl BookDocument {
    /// Fresh document for a newly catalogued book, published now and not borrowed
    pub fn from_fields(fields: &BookFields) -> Self {
        Self {
            id: ObjectId::new(),
            title: fields.title.clone(),
            author: fields.author.clone(),
            category: fields.category.clone(),
            description: Some(fields.description.clone()),
            published_date: Some(bson::DateTime::now()),
            borrowed_by: Some(Vec::new()),
        }
    }
}

/// Book as seen by services and templates
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub category: String,
    pub description: String,
    pub published_date: Option<DateTime<Utc>>,
    /// Hex identifiers of the users currently holding the book
    pub borrowed_by: Vec<String>,
}

impl Book {
    pub fn is_borrowed_by(&self, user_id: &str) -> bool {
        self.borrowed_by.iter().any(|id| id == user_id)
    }
}

impl From<BookDocument> for Book {
    fn from(doc: BookDocument) -> Self {
        Self {
            id: doc.id.to_hex(),
            title: doc.title,
            author: doc.author,
            category: doc.category,
            description: doc.description.unwrap_or_default(),
            published_date: doc.published_date.map(|d| d.to_chrono()),
            borrowed_by: doc.borrowed_by.unwrap_or_default(),
        }
    }
}

/// Editable book attributes, shared by the admin add and edit forms
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub category: String,
    pub description: String,
}

/// Number of books filed under one category
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryCount {
    pub name: String,
    pub count: u64,
}
