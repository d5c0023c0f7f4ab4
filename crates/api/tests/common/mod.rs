#![allow(dead_code)]

use std::time::Duration;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;

use turnstile_api::auth::password::hash_password;
use turnstile_api::auth::session::{SessionConfig, SessionManager};
use turnstile_api::config::ServerConfig;
use turnstile_api::router::build_app_router;
use turnstile_api::state::AppState;
use turnstile_core::account::AccountStatus;
use turnstile_core::session::SessionPolicy;
use turnstile_db::models::account::{Account, CreateAccount};
use turnstile_db::repositories::AccountRepo;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TOKEN_COOKIE: &str = "session_token";
pub const HINT_COOKIE: &str = "session_expiry";
pub const PASSWORD: &str = "correct-horse-battery-staple";

pub fn test_session_config() -> SessionConfig {
    SessionConfig {
        secret: TEST_SECRET.to_string(),
        policy: SessionPolicy::default(),
        cookie_name: TOKEN_COOKIE.to_string(),
        cookie_secure: false,
        store_timeout: Duration::from_secs(5),
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        cleanup_interval_secs: 3600,
        session: test_session_config(),
    }
}

/// Build the full application router, with the production middleware stack,
/// over the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState::new(pool, config.session.clone());
    build_app_router(state, &config)
}

/// A pool whose server accepts connections and never answers.
pub async fn stalled_pool() -> PgPool {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(30))
        .connect_lazy(&format!("postgres://turnstile:turnstile@{addr}/turnstile"))
        .unwrap()
}

pub fn test_manager(pool: &PgPool) -> SessionManager {
    SessionManager::new(pool.clone(), test_session_config())
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn create_account(
    pool: &PgPool,
    email: &str,
    is_admin: bool,
    status: AccountStatus,
) -> Account {
    let input = CreateAccount {
        email: email.to_string(),
        password_hash: hash_password(PASSWORD).expect("hashing should succeed"),
        is_admin,
        status,
    };
    AccountRepo::create(pool, &input)
        .await
        .expect("account creation should succeed")
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    json: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(COOKIE, format!("{TOKEN_COOKIE}={token}"));
    }
    let body = match json {
        Some(value) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&value).unwrap())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_with_session(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(json)).await
}

pub async fn post_with_session(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, Method::POST, uri, token, None).await
}

pub async fn delete_with_session(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Cookies
// ---------------------------------------------------------------------------

/// Full `Set-Cookie` header for `name`, if the response set one.
pub fn set_cookie_header(response: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&prefix))
        .map(str::to_string)
}

/// Value of the cookie `name` set by the response.
pub fn set_cookie_value(response: &Response<Body>, name: &str) -> Option<String> {
    let header = set_cookie_header(response, name)?;
    let pair = header.split(';').next()?;
    pair.split_once('=').map(|(_, value)| value.to_string())
}

/// Assert the response tells the client to drop both session cookies.
pub fn assert_cookies_cleared(response: &Response<Body>) {
    for name in [TOKEN_COOKIE, HINT_COOKIE] {
        let header = set_cookie_header(response, name)
            .unwrap_or_else(|| panic!("expected a removal cookie for {name}"));
        assert!(header.contains("Max-Age=0"), "not a removal: {header}");
        assert_eq!(set_cookie_value(response, name).as_deref(), Some(""));
    }
}

/// Log in through the API and return the issued raw token.
pub async fn login(app: Router, email: &str) -> String {
    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "login": email, "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    set_cookie_value(&response, TOKEN_COOKIE).expect("login must set the token cookie")
}
