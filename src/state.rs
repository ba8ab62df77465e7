use std::sync::Arc;

use mongodb::{options::ClientOptions, Client};

use crate::{
    auth::clock::SystemClock,
    config::Config,
    credentials::MongoCredentials,
    services::SessionIssuer,
    store::{MongoSessionStore, StoreError},
};

#[derive(Clone)]
pub struct AppState {
    pub issuer: SessionIssuer,
    pub cfg: Arc<Config>,
}

impl AppState {
    pub async fn new(cfg: &Config) -> Result<Self, StoreError> {
        let mut opts = ClientOptions::parse(&cfg.database.mongodb_uri).await?;
        opts.app_name = Some("session-issuer".to_string());
        let client = Client::with_options(opts)?;
        let db = client.database(&cfg.database.db_name);

        let sessions = MongoSessionStore::new(&db).await?;
        let credentials = MongoCredentials::new(&db);

        let issuer = SessionIssuer::new(
            &cfg.tokens,
            Arc::new(sessions),
            Arc::new(credentials),
            Arc::new(SystemClock),
        );

        Ok(Self::with_issuer(cfg, issuer))
    }

    /// Wires an already-built issuer; used with in-memory backends.
    pub fn with_issuer(cfg: &Config, issuer: SessionIssuer) -> Self {
        Self {
            issuer,
            cfg: Arc::new(cfg.clone()),
        }
    }
}
