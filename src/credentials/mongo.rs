use async_trait::async_trait;
use mongodb::{
    bson::{doc, DateTime as BsonDateTime},
    error::{ErrorKind, WriteFailure},
    Collection, Database,
};

use super::{CredentialVerifier, VerifierError};
use crate::{
    models::user::UserDoc,
    password::{hash_password, verify_password},
};

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoCredentials {
    users: Collection<UserDoc>,
}

impl MongoCredentials {
    pub const COLLECTION: &'static str = "users";

    pub fn new(db: &Database) -> Self {
        Self {
            users: db.collection(Self::COLLECTION),
        }
    }

    pub async fn add_user(&self, login: &str, password: &str) -> Result<(), VerifierError> {
        let user = UserDoc {
            login: login.to_string(),
            password_hash: hash_password(password)?,
            created_at: BsonDateTime::now(),
        };

        match self.users.insert_one(&user).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(VerifierError::Duplicate),
            Err(e) => Err(e.into()),
        }
    }
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(w)) if w.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl CredentialVerifier for MongoCredentials {
    async fn verify(&self, login: &str, password: &str) -> Result<bool, VerifierError> {
        let user = self.users.find_one(doc! { "_id": login }).await?;

        match user {
            Some(user) => verify_password(password, &user.password_hash),
            None => Ok(false),
        }
    }
}
