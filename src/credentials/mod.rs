//! Login/password checks against stored argon2 digests.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryCredentials;
pub use mongo::MongoCredentials;

#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("credential store: {0}")]
    Backend(String),

    #[error("password hash: {0}")]
    Hash(String),

    #[error("user already exists")]
    Duplicate,
}

impl From<mongodb::error::Error> for VerifierError {
    fn from(e: mongodb::error::Error) -> Self {
        VerifierError::Backend(e.to_string())
    }
}

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// `Ok(false)` for an unknown login or a wrong password.
    async fn verify(&self, login: &str, password: &str) -> Result<bool, VerifierError>;
}
