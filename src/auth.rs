pub mod clock;
pub mod jwt;

use std::sync::Arc;

use axum::RequestPartsExt;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    errors::{AppError, Unauthorized},
    state::AppState,
};

pub use jwt::Claims;

/// Principal attached to a request by a valid `Authorization: Bearer <access token>`.
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

impl FromRequestParts<Arc<AppState>> for AuthClaims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Unauthorized(Unauthorized::InvalidAccessToken))?;

        let claims = state.issuer.authenticate(bearer.token())?;
        Ok(Self(claims))
    }
}
