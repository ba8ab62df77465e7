use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{auth::jwt::TokenError, credentials::VerifierError, store::StoreError};

/// Why a request was refused with 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Unauthorized {
    #[error("invalid auth data")]
    InvalidCredentials,

    #[error("refresh token is required")]
    RefreshRequired,

    #[error("refresh token is not exist")]
    RefreshNotExist,

    #[error("refresh token is expired")]
    RefreshExpired,

    #[error("invalid access token")]
    InvalidAccessToken,
}

impl Unauthorized {
    pub fn reason(&self) -> &'static str {
        match self {
            Unauthorized::InvalidCredentials => "invalid_credentials",
            Unauthorized::RefreshRequired => "required",
            Unauthorized::RefreshNotExist => "not_exist",
            Unauthorized::RefreshExpired => "expired",
            Unauthorized::InvalidAccessToken => "invalid_token",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(Unauthorized),

    #[error("Dependency error: {0}")]
    Dependency(String),
}

impl From<Unauthorized> for AppError {
    fn from(u: Unauthorized) -> Self {
        AppError::Unauthorized(u)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Dependency(e.to_string())
    }
}

impl From<VerifierError> for AppError {
    fn from(e: VerifierError) -> Self {
        AppError::Dependency(e.to_string())
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Invalid => AppError::Unauthorized(Unauthorized::InvalidAccessToken),
            TokenError::Encode(_) => AppError::Dependency(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg, reason) = match &self {
            AppError::Validation(s) => (StatusCode::BAD_REQUEST, s.clone(), "bad_request"),
            AppError::Unauthorized(u) => (StatusCode::UNAUTHORIZED, u.to_string(), u.reason()),
            AppError::Dependency(s) => {
                tracing::error!(error = %s, "dependency failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                    "internal",
                )
            }
        };

        (status, Json(json!({ "error": msg, "reason": reason }))).into_response()
    }
}
