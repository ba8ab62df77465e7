use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{CredentialVerifier, VerifierError};
use crate::password::{hash_password, verify_password};

#[derive(Debug, Default)]
pub struct MemoryCredentials {
    users: RwLock<HashMap<String, String>>,
}

impl MemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, login: &str, password: &str) -> Result<(), VerifierError> {
        let hash = hash_password(password)?;
        let mut users = self.users.write();
        if users.contains_key(login) {
            return Err(VerifierError::Duplicate);
        }
        users.insert(login.to_string(), hash);
        Ok(())
    }
}

#[async_trait]
impl CredentialVerifier for MemoryCredentials {
    async fn verify(&self, login: &str, password: &str) -> Result<bool, VerifierError> {
        let hash = match self.users.read().get(login) {
            Some(h) => h.clone(),
            None => return Ok(false),
        };
        verify_password(password, &hash)
    }
}
