use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{RefreshSession, SessionStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    by_principal: HashMap<String, RefreshSession>,
    // refresh token -> principal
    by_token: HashMap<String, String>,
}

/// Process-local store. Both indexes sit behind one lock so a replace is atomic.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    tables: Mutex<Tables>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tables.lock().by_principal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn session_of(&self, principal: &str) -> Option<RefreshSession> {
        self.tables.lock().by_principal.get(principal).cloned()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, session: RefreshSession) -> Result<(), StoreError> {
        let mut t = self.tables.lock();
        if let Some(old) = t.by_principal.remove(&session.principal) {
            t.by_token.remove(&old.refresh_token);
        }
        t.by_token
            .insert(session.refresh_token.clone(), session.principal.clone());
        t.by_principal.insert(session.principal.clone(), session);
        Ok(())
    }

    async fn get(&self, refresh_token: &str) -> Result<Option<RefreshSession>, StoreError> {
        let t = self.tables.lock();
        Ok(t.by_token
            .get(refresh_token)
            .and_then(|principal| t.by_principal.get(principal))
            .cloned())
    }

    async fn remove(&self, principal: &str) -> Result<(), StoreError> {
        let mut t = self.tables.lock();
        if let Some(old) = t.by_principal.remove(principal) {
            t.by_token.remove(&old.refresh_token);
        }
        Ok(())
    }
}
