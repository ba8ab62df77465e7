use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::{
    config::HttpConfig,
    dto::auth::{AccessTokenResponse, ErrorResponse, LoginRequest, MeResponse},
    handlers::auth as auth_handlers,
    state::AppState,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth_handlers::login,
        auth_handlers::refresh,
        auth_handlers::logout,
        auth_handlers::me
    ),
    components(schemas(LoginRequest, AccessTokenResponse, MeResponse, ErrorResponse)),
    modifiers(&BearerAuth),
    tags((name = "auth", description = "Login, token renewal and logout"))
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth", post(auth_handlers::login))
        .route("/auth/refresh", post(auth_handlers::refresh))
        .route("/auth/logout", post(auth_handlers::logout))
        .route("/auth/me", get(auth_handlers::me))
        .route("/api-docs/openapi.json", get(openapi))
        .with_state(state)
}

/// Browsers only send the refresh cookie cross-origin to an explicit origin with credentials.
pub fn cors_layer(http: &HttpConfig) -> Result<CorsLayer, header::InvalidHeaderValue> {
    match &http.cors_origin {
        None => Ok(CorsLayer::permissive()),
        Some(origin) => Ok(CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])),
    }
}
