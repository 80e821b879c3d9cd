//! Books collection backed by MongoDB

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use futures::TryStreamExt;
use mongodb::{options::FindOptions, Collection, Database};

use crate::models::{Book, BookDocument, BookFields, CategoryCount};

use super::{parse_id, BookQuery, BookStore, StoreError, StoreResult};

const COLLECTION: &str = "books";

#[derive(Clone)]
pub struct BooksRepository {
    collection: Collection<BookDocument>,
}

impl BooksRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(COLLECTION),
        }
    }

    fn missing(id: &str) -> StoreError {
        StoreError::Missing {
            collection: COLLECTION,
            id: id.to_string(),
        }
    }

    /// Category equality plus an optional literal, case-insensitive title/author match
    fn listing_filter(query: &BookQuery) -> Document {
        let mut filter = doc! { "category": query.category.as_str() };
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = regex::escape(search);
            filter.insert(
                "$or",
                vec![
                    doc! { "title": { "$regex": pattern.as_str(), "$options": "i" } },
                    doc! { "author": { "$regex": pattern.as_str(), "$options": "i" } },
                ],
            );
        }
        filter
    }
}

/// `$pull` condition matching a borrower stored either as hex text or as an ObjectId
fn borrower_match(user_id: &str) -> Bson {
    match ObjectId::parse_str(user_id) {
        Ok(oid) => Bson::Document(doc! { "$in": [user_id, oid] }),
        Err(_) => Bson::String(user_id.to_string()),
    }
}

fn count_field(doc: &Document) -> u64 {
    match doc.get("count") {
        Some(Bson::Int32(n)) => u64::try_from(*n).unwrap_or(0),
        Some(Bson::Int64(n)) => u64::try_from(*n).unwrap_or(0),
        _ => 0,
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn count(&self) -> StoreResult<u64> {
        Ok(self.collection.count_documents(doc! {}, None).await?)
    }

    async fn category_counts(&self) -> StoreResult<Vec<CategoryCount>> {
        let pipeline = vec![
            doc! { "$group": { "_id": "$category", "count": { "$sum": 1 } } },
            doc! { "$sort": { "count": -1, "_id": 1 } },
        ];
        let groups: Vec<Document> = self.collection.aggregate(pipeline, None).await?.try_collect().await?;

        Ok(groups
            .iter()
            .filter_map(|group| {
                let name = group.get_str("_id").ok()?;
                Some(CategoryCount {
                    name: name.to_string(),
                    count: count_field(group),
                })
            })
            .collect())
    }

    async fn recent(&self, limit: u64) -> StoreResult<Vec<Book>> {
        let options = FindOptions::builder()
            .sort(doc! { "_id": -1 })
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .build();
        let docs: Vec<BookDocument> = self.collection.find(doc! {}, options).await?.try_collect().await?;
        Ok(docs.into_iter().map(Book::from).collect())
    }

    async fn search(&self, query: &BookQuery) -> StoreResult<(Vec<Book>, u64)> {
        let filter = Self::listing_filter(query);
        let total = self.collection.count_documents(filter.clone(), None).await?;

        let options = FindOptions::builder()
            // the server takes a signed skip
            .skip(query.skip.min(i64::MAX as u64))
            .limit(i64::try_from(query.limit).unwrap_or(i64::MAX))
            .build();
        let docs: Vec<BookDocument> = self.collection.find(filter, options).await?.try_collect().await?;

        Ok((docs.into_iter().map(Book::from).collect(), total))
    }

    async fn list(&self) -> StoreResult<Vec<Book>> {
        let docs: Vec<BookDocument> = self.collection.find(doc! {}, None).await?.try_collect().await?;
        Ok(docs.into_iter().map(Book::from).collect())
    }

    async fn get(&self, id: &str) -> StoreResult<Book> {
        let oid = parse_id(id)?;
        self.collection
            .find_one(doc! { "_id": oid }, None)
            .await?
            .map(Book::from)
            .ok_or_else(|| Self::missing(id))
    }

    async fn insert(&self, fields: &BookFields) -> StoreResult<String> {
        self.insert_document(BookDocument::from_fields(fields)).await
    }

    async fn update(&self, id: &str, fields: &BookFields) -> StoreResult<()> {
        let oid = parse_id(id)?;
        let update = doc! {
            "$set": {
                "title": fields.title.as_str(),
                "author": fields.author.as_str(),
                "category": fields.category.as_str(),
                "description": fields.description.as_str(),
            }
        };
        let result = self.collection.update_one(doc! { "_id": oid }, update, None).await?;
        if result.matched_count == 0 {
            return Err(Self::missing(id));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let oid = parse_id(id)?;
        let result = self.collection.delete_one(doc! { "_id": oid }, None).await?;
        if result.deleted_count == 0 {
            return Err(Self::missing(id));
        }
        Ok(())
    }

    async fn add_borrower(&self, id: &str, user_id: &str) -> StoreResult<()> {
        let oid = parse_id(id)?;
        let result = self
            .collection
            .update_one(doc! { "_id": oid }, doc! { "$addToSet": { "borrowed_by": user_id } }, None)
            .await?;
        if result.matched_count == 0 {
            return Err(Self::missing(id));
        }
        Ok(())
    }

    async fn remove_borrower(&self, id: &str, user_id: &str) -> StoreResult<()> {
        let oid = parse_id(id)?;
        let result = self
            .collection
            .update_one(doc! { "_id": oid }, doc! { "$pull": { "borrowed_by": borrower_match(user_id) } }, None)
            .await?;
        if result.matched_count == 0 {
            return Err(Self::missing(id));
        }
        Ok(())
    }

    async fn insert_document(&self, book: BookDocument) -> StoreResult<String> {
        self.collection.insert_one(&book, None).await?;
        Ok(book.id.to_hex())
    }

    async fn clear(&self) -> StoreResult<()> {
        self.collection.delete_many(doc! {}, None).await?;
        Ok(())
    }
}
