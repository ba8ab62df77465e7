use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use session_issuer::{
    auth::clock::ManualClock,
    config::Config,
    credentials::MemoryCredentials,
    routes::app_router,
    services::SessionIssuer,
    state::AppState,
    store::MemorySessionStore,
};

struct TestApp {
    router: Router,
    store: Arc<MemorySessionStore>,
    clock: Arc<ManualClock>,
}

fn test_config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("MONGODB_URI", "mongodb://unused"),
        ("ACCESS_TOKEN_SECRET", "test-access-secret"),
        ("REFRESH_TOKEN_SECRET", "test-refresh-secret"),
        ("ACCESS_TOKEN_TTL_SECONDS", "30"),
        ("REFRESH_TOKEN_TTL_SECONDS", "60"),
    ]);
    Config::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap()
}

fn test_app() -> TestApp {
    let cfg = test_config();
    let store = Arc::new(MemorySessionStore::new());
    let creds = Arc::new(MemoryCredentials::new());
    creds.add_user("demo", "demo").unwrap();
    let clock = Arc::new(ManualClock::new(Utc::now()));

    let issuer = SessionIssuer::new(&cfg.tokens, store.clone(), creds, clock.clone());
    let state = Arc::new(AppState::with_issuer(&cfg, issuer));

    TestApp {
        router: app_router(state),
        store,
        clock,
    }
}

struct Reply {
    status: StatusCode,
    set_cookie: Option<String>,
    body: Value,
}

async fn send(router: &Router, req: Request<Body>) -> Reply {
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    Reply {
        status,
        set_cookie,
        body,
    }
}

async fn post_login(router: &Router, login: &str, password: &str) -> Reply {
    let req = Request::builder()
        .method("POST")
        .uri("/auth")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "login": login, "password": password }).to_string(),
        ))
        .unwrap();
    send(router, req).await
}

async fn post_with_cookie(router: &Router, uri: &str, refresh_token: Option<&str>) -> Reply {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(token) = refresh_token {
        builder = builder.header(header::COOKIE, format!("refreshToken={token}"));
    }
    send(router, builder.body(Body::empty()).unwrap()).await
}

async fn get_me(router: &Router, bearer: Option<&str>) -> Reply {
    let mut builder = Request::builder().method("GET").uri("/auth/me");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    send(router, builder.body(Body::empty()).unwrap()).await
}

fn refresh_token_from(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .and_then(|kv| kv.trim().strip_prefix("refreshToken="))
        .expect("refreshToken cookie")
        .to_string()
}

#[tokio::test]
async fn login_returns_access_token_and_http_only_cookie() {
    let app = test_app();
    let reply = post_login(&app.router, "demo", "demo").await;

    assert_eq!(reply.status, StatusCode::OK);
    let access = reply.body["accessToken"].as_str().unwrap();
    assert!(!access.is_empty());

    let cookie = reply.set_cookie.expect("set-cookie header");
    assert!(cookie.contains("refreshToken="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=60"));

    let token = refresh_token_from(&cookie);
    assert_eq!(app.store.session_of("demo").unwrap().refresh_token, token);
}

#[tokio::test]
async fn bad_credentials_are_401_without_cookie_or_session() {
    let app = test_app();
    let reply = post_login(&app.router, "x", "wrong").await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert!(reply.set_cookie.is_none());
    assert!(reply.body.get("accessToken").is_none());
    assert_eq!(reply.body["reason"], "invalid_credentials");
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn empty_password_is_400() {
    let app = test_app();
    let reply = post_login(&app.router, "demo", "").await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], "login and password are required");
    assert_eq!(reply.body["reason"], "bad_request");
}

#[tokio::test]
async fn missing_login_field_is_400() {
    let app = test_app();
    let req = Request::builder()
        .method("POST")
        .uri("/auth")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "password": "demo" }).to_string()))
        .unwrap();
    let reply = send(&app.router, req).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], "login and password are required");
}

#[tokio::test]
async fn refresh_without_cookie_is_required() {
    let app = test_app();
    let reply = post_with_cookie(&app.router, "/auth/refresh", None).await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["error"], "refresh token is required");
    assert_eq!(reply.body["reason"], "required");
}

#[tokio::test]
async fn refresh_with_unknown_token_is_not_exist() {
    let app = test_app();
    let reply = post_with_cookie(&app.router, "/auth/refresh", Some("foo")).await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["error"], "refresh token is not exist");
    assert_eq!(reply.body["reason"], "not_exist");
}

#[tokio::test]
async fn refresh_after_expiry_is_expired() {
    let app = test_app();
    let login = post_login(&app.router, "demo", "demo").await;
    let token = refresh_token_from(&login.set_cookie.unwrap());

    app.clock.advance(Duration::seconds(61));
    let reply = post_with_cookie(&app.router, "/auth/refresh", Some(&token)).await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["error"], "refresh token is expired");
    assert_eq!(reply.body["reason"], "expired");
}

#[tokio::test]
async fn refresh_issues_usable_access_token() {
    let app = test_app();
    let login = post_login(&app.router, "demo", "demo").await;
    let token = refresh_token_from(&login.set_cookie.unwrap());

    // the first access token has run out, the refresh session has not
    app.clock.advance(Duration::seconds(45));
    let old_access = login.body["accessToken"].as_str().unwrap().to_string();
    assert_eq!(
        get_me(&app.router, Some(&old_access)).await.status,
        StatusCode::UNAUTHORIZED
    );

    let reply = post_with_cookie(&app.router, "/auth/refresh", Some(&token)).await;
    assert_eq!(reply.status, StatusCode::OK);
    let fresh = reply.body["accessToken"].as_str().unwrap();

    let me = get_me(&app.router, Some(fresh)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["login"], "demo");
}

#[tokio::test]
async fn second_login_supersedes_first_refresh_token() {
    let app = test_app();
    let first = refresh_token_from(&post_login(&app.router, "demo", "demo").await.set_cookie.unwrap());
    let second =
        refresh_token_from(&post_login(&app.router, "demo", "demo").await.set_cookie.unwrap());

    assert_eq!(app.store.len(), 1);
    let stale = post_with_cookie(&app.router, "/auth/refresh", Some(&first)).await;
    assert_eq!(stale.body["reason"], "not_exist");

    let live = post_with_cookie(&app.router, "/auth/refresh", Some(&second)).await;
    assert_eq!(live.status, StatusCode::OK);
}

#[tokio::test]
async fn logout_clears_cookie_and_session() {
    let app = test_app();
    let token = refresh_token_from(&post_login(&app.router, "demo", "demo").await.set_cookie.unwrap());

    let reply = post_with_cookie(&app.router, "/auth/logout", Some(&token)).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);
    assert!(reply.set_cookie.unwrap().contains("Max-Age=0"));
    assert!(app.store.is_empty());

    let again = post_with_cookie(&app.router, "/auth/logout", Some(&token)).await;
    assert_eq!(again.status, StatusCode::NO_CONTENT);

    let refresh = post_with_cookie(&app.router, "/auth/refresh", Some(&token)).await;
    assert_eq!(refresh.body["reason"], "not_exist");
}

#[tokio::test]
async fn me_rejects_missing_and_wrong_kind_of_token() {
    let app = test_app();
    let none = get_me(&app.router, None).await;
    assert_eq!(none.status, StatusCode::UNAUTHORIZED);
    assert_eq!(none.body["reason"], "invalid_token");

    let token = refresh_token_from(&post_login(&app.router, "demo", "demo").await.set_cookie.unwrap());
    let wrong = get_me(&app.router, Some(&token)).await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["reason"], "invalid_token");
}

#[tokio::test]
async fn openapi_document_lists_auth_routes() {
    let app = test_app();
    let req = Request::builder()
        .uri("/api-docs/openapi.json")
        .body(Body::empty())
        .unwrap();
    let reply = send(&app.router, req).await;

    assert_eq!(reply.status, StatusCode::OK);
    let paths = reply.body["paths"].as_object().unwrap();
    for p in ["/auth", "/auth/refresh", "/auth/logout", "/auth/me"] {
        assert!(paths.contains_key(p), "missing {p}");
    }
}
