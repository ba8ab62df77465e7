//! Token lifecycle: login issues an access/refresh pair and records the
//! refresh session; refresh trades a live session for a new access token.

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    auth::{
        clock::Clock,
        jwt::{Claims, MintedToken, TokenCodec},
    },
    config::TokenConfig,
    credentials::CredentialVerifier,
    errors::{AppError, Unauthorized},
    store::{RefreshSession, SessionStore},
};

#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access: MintedToken,
    pub refresh: MintedToken,
}

#[derive(Clone)]
pub struct SessionIssuer {
    access: TokenCodec,
    refresh: TokenCodec,
    store: Arc<dyn SessionStore>,
    verifier: Arc<dyn CredentialVerifier>,
    clock: Arc<dyn Clock>,
}

impl SessionIssuer {
    pub fn new(
        tokens: &TokenConfig,
        store: Arc<dyn SessionStore>,
        verifier: Arc<dyn CredentialVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            access: TokenCodec::new(&tokens.access_secret, tokens.access_ttl, clock.clone()),
            refresh: TokenCodec::new(&tokens.refresh_secret, tokens.refresh_ttl, clock.clone()),
            store,
            verifier,
            clock,
        }
    }

    pub fn refresh_ttl(&self) -> chrono::Duration {
        self.refresh.ttl()
    }

    pub async fn login(&self, login: &str, password: &str) -> Result<IssuedTokens, AppError> {
        if login.is_empty() || password.is_empty() {
            return Err(AppError::Validation("login and password are required".into()));
        }

        if !self.verifier.verify(login, password).await? {
            debug!(login, "login rejected");
            return Err(Unauthorized::InvalidCredentials.into());
        }

        let access = self.access.mint(login)?;
        let refresh = self.refresh.mint(login)?;

        // evicts any earlier session of this login
        self.store
            .put(RefreshSession {
                principal: login.to_string(),
                refresh_token: refresh.token.clone(),
                expires_at: refresh.expires_at,
            })
            .await?;

        info!(login, expires_at = %refresh.expires_at, "session issued");
        Ok(IssuedTokens { access, refresh })
    }

    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<MintedToken, AppError> {
        let refresh_token = match refresh_token {
            Some(t) if !t.is_empty() => t,
            _ => return Err(Unauthorized::RefreshRequired.into()),
        };

        // forged and superseded tokens both land here
        let session = self
            .store
            .get(refresh_token)
            .await?
            .ok_or(AppError::Unauthorized(Unauthorized::RefreshNotExist))?;

        if session.expires_at <= self.clock.now() {
            debug!(principal = %session.principal, "refresh session expired");
            return Err(Unauthorized::RefreshExpired.into());
        }

        let access = self.access.mint(&session.principal)?;
        debug!(principal = %session.principal, "access token renewed");
        Ok(access)
    }

    /// Drops the session the token belongs to. Unknown or superseded tokens are a no-op.
    pub async fn logout(&self, refresh_token: Option<&str>) -> Result<(), AppError> {
        let Some(refresh_token) = refresh_token.filter(|t| !t.is_empty()) else {
            return Ok(());
        };

        if let Some(session) = self.store.get(refresh_token).await? {
            self.store.remove(&session.principal).await?;
            info!(principal = %session.principal, "session closed");
        }
        Ok(())
    }

    pub fn authenticate(&self, access_token: &str) -> Result<Claims, AppError> {
        Ok(self.access.verify(access_token)?)
    }
}
