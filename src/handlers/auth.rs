use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::DateTime;

use crate::{
    auth::AuthClaims,
    dto::auth::{AccessTokenResponse, ErrorResponse, LoginRequest, MeResponse},
    errors::{AppError, Unauthorized},
    state::AppState,
};

pub const REFRESH_COOKIE: &str = "refreshToken";

fn refresh_cookie(value: String, max_age: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(max_age.num_seconds()))
        .build()
}

fn clear_refresh_cookie() -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

#[utoipa::path(
    post,
    path = "/auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token; refresh token set as HttpOnly cookie", body = AccessTokenResponse),
        (status = 400, description = "Login or password missing", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AccessTokenResponse>), AppError> {
    let login = req.login.trim();
    let issued = state.issuer.login(login, &req.password).await?;

    let cookie = refresh_cookie(
        issued.refresh.token,
        state.issuer.refresh_ttl(),
        state.cfg.http.cookie_secure,
    );

    Ok((
        jar.add(cookie),
        Json(AccessTokenResponse {
            access_token: issued.access.token,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "Fresh access token", body = AccessTokenResponse),
        (status = 401, description = "Refresh token missing, unknown or expired", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Json<AccessTokenResponse>, AppError> {
    let token = jar.get(REFRESH_COOKIE).map(|c| c.value());
    let access = state.issuer.refresh(token).await?;

    Ok(Json(AccessTokenResponse {
        access_token: access.token,
    }))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Session closed and cookie cleared")
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar), AppError> {
    let token = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());
    state.issuer.logout(token.as_deref()).await?;

    Ok((StatusCode::NO_CONTENT, jar.add(clear_refresh_cookie())))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Principal of the bearer access token", body = MeResponse),
        (status = 401, description = "Missing, invalid or expired access token", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn me(AuthClaims(claims): AuthClaims) -> Result<Json<MeResponse>, AppError> {
    let expires_at = DateTime::from_timestamp(claims.exp, 0)
        .ok_or(AppError::Unauthorized(Unauthorized::InvalidAccessToken))?;

    Ok(Json(MeResponse {
        login: claims.sub,
        expires_at,
    }))
}
