use async_trait::async_trait;
use chrono::Utc;
use mongodb::{bson::doc, options::IndexOptions, Collection, Database, IndexModel};

use super::{RefreshSession, SessionStore, StoreError};
use crate::models::refresh_session::RefreshSessionDoc;

#[derive(Clone)]
pub struct MongoSessionStore {
    sessions: Collection<RefreshSessionDoc>,
}

impl MongoSessionStore {
    pub const COLLECTION: &'static str = "refresh_sessions";

    pub async fn new(db: &Database) -> Result<Self, StoreError> {
        let sessions: Collection<RefreshSessionDoc> = db.collection(Self::COLLECTION);

        // `_id` is the principal, which already gives one row per principal.
        let token_index = IndexModel::builder()
            .keys(doc! { "refresh_token": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let _ = sessions.create_index(token_index).await?;

        Ok(Self { sessions })
    }
}

#[async_trait]
impl SessionStore for MongoSessionStore {
    async fn put(&self, session: RefreshSession) -> Result<(), StoreError> {
        let doc_rs = RefreshSessionDoc::from_session(&session, Utc::now());

        // single-document upsert: atomic, last commit wins
        self.sessions
            .replace_one(doc! { "_id": &session.principal }, &doc_rs)
            .upsert(true)
            .await?;

        Ok(())
    }

    async fn get(&self, refresh_token: &str) -> Result<Option<RefreshSession>, StoreError> {
        let found = self
            .sessions
            .find_one(doc! { "refresh_token": refresh_token })
            .await?;

        match found {
            None => Ok(None),
            Some(d) => d
                .into_session()
                .map(Some)
                .ok_or_else(|| StoreError::Backend("stored expiry out of range".into())),
        }
    }

    async fn remove(&self, principal: &str) -> Result<(), StoreError> {
        self.sessions.delete_one(doc! { "_id": principal }).await?;
        Ok(())
    }
}
