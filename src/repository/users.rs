//! Users collection backed by MongoDB

use async_trait::async_trait;
use bson::doc;
use futures::TryStreamExt;
use mongodb::{Collection, Database};

use crate::models::{NewUser, User, UserDocument, UserFields};

use super::{parse_id, StoreError, StoreResult, UserStore};

const COLLECTION: &str = "users";

#[derive(Clone)]
pub struct UsersRepository {
    collection: Collection<UserDocument>,
}

impl UsersRepository {
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
}

#[async_trait]
impl UserStore for UsersRepository {
    async fn count(&self) -> StoreResult<u64> {
        Ok(self.collection.count_documents(doc! {}, None).await?)
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let docs: Vec<UserDocument> = self.collection.find(doc! {}, None).await?.try_collect().await?;
        Ok(docs.into_iter().map(User::from).collect())
    }

    async fn get(&self, id: &str) -> StoreResult<User> {
        let oid = parse_id(id)?;
        self.collection
            .find_one(doc! { "_id": oid }, None)
            .await?
            .map(User::from)
            .ok_or_else(|| Self::missing(id))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = self.collection.find_one(doc! { "email": email }, None).await?;
        Ok(user.map(User::from))
    }

    async fn insert(&self, user: &NewUser) -> StoreResult<String> {
        let document = UserDocument::from_new(user);
        self.collection.insert_one(&document, None).await?;
        Ok(document.id.to_hex())
    }

    async fn update(&self, id: &str, fields: &UserFields) -> StoreResult<()> {
        let oid = parse_id(id)?;
        let update = doc! {
            "$set": {
                "name": fields.name.as_str(),
                "email": fields.email.as_str(),
                "role": fields.role.as_str(),
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

    async fn clear(&self) -> StoreResult<()> {
        self.collection.delete_many(doc! {}, None).await?;
        Ok(())
    }
}
