use chrono::{DateTime, Utc};
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};

use crate::store::RefreshSession;

/// One document per principal: the login is the `_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshSessionDoc {
    #[serde(rename = "_id")]
    pub principal: String,

    pub refresh_token: String,

    pub created_at: BsonDateTime,
    pub expires_at: BsonDateTime,
}

impl RefreshSessionDoc {
    pub fn from_session(session: &RefreshSession, created_at: DateTime<Utc>) -> Self {
        Self {
            principal: session.principal.clone(),
            refresh_token: session.refresh_token.clone(),
            created_at: BsonDateTime::from_millis(created_at.timestamp_millis()),
            expires_at: BsonDateTime::from_millis(session.expires_at.timestamp_millis()),
        }
    }

    pub fn into_session(self) -> Option<RefreshSession> {
        let expires_at = DateTime::<Utc>::from_timestamp_millis(self.expires_at.timestamp_millis())?;
        Some(RefreshSession {
            principal: self.principal,
            refresh_token: self.refresh_token,
            expires_at,
        })
    }
}
