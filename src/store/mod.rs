//! Refresh session persistence.
//!
//! A principal owns at most one refresh session. Backends must make `put`
//! a single atomic replace: a concurrent reader sees either the old session
//! or the new one, never both and never neither.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use memory::MemorySessionStore;
pub use mongo::MongoSessionStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store: {0}")]
    Backend(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSession {
    pub principal: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Replaces whatever session `session.principal` had.
    async fn put(&self, session: RefreshSession) -> Result<(), StoreError>;

    /// Exact-match lookup by token value.
    async fn get(&self, refresh_token: &str) -> Result<Option<RefreshSession>, StoreError>;

    /// Idempotent.
    async fn remove(&self, principal: &str) -> Result<(), StoreError>;
}
