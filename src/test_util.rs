//! Shared helpers for router-level tests.

use crate::app::build_router;
use crate::config::Config;
use crate::middleware::cors::{CorsPolicy, DEFAULT_ALLOWED_ORIGINS};
use crate::middleware::session::{manager_layer, SessionSettings};
use crate::state::AppState;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tower::ServiceExt;
use tower_sessions::cookie::Key;
use tower_sessions_sqlx_store::SqliteStore;

pub const TEST_ORIGIN: &str = "http://localhost:3000";

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 5000,
        database_url: "sqlite::memory:".to_string(),
        session_secret: "s".repeat(64),
        allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        cookie_secure: false,
    }
}

/// Single-connection pool; every new connection to `:memory:` would be a fresh database
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    crate::db::run_migrations(&pool).await.unwrap();
    pool
}

pub async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn set_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// `name=value` part of the Set-Cookie header
    pub fn cookie_pair(&self) -> Option<String> {
        self.set_cookie()
            .and_then(|c| c.split(';').next().map(str::to_string))
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// The full application over an in-memory database, with a one-cookie jar
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    cookie: Option<String>,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = memory_pool().await;

        let store = SqliteStore::new(pool.clone());
        store.migrate().await.unwrap();

        let state = AppState::from_parts(pool.clone(), CorsPolicy::default());
        let settings = SessionSettings::new(Key::generate(), false);
        let router = build_router(state, manager_layer(store, &settings));

        Self {
            router,
            pool,
            cookie: None,
        }
    }

    pub fn set_cookie(&mut self, cookie: String) {
        self.cookie = Some(cookie);
    }

    pub fn clear_cookie(&mut self) {
        self.cookie = None;
    }

    /// Send a request, attaching and then updating the stored cookie
    pub async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = read_json(response).await;

        let response = TestResponse {
            status,
            headers,
            body,
        };

        if let Some(set_cookie) = response.set_cookie() {
            if set_cookie.contains("Max-Age=0") {
                self.cookie = None;
            } else {
                self.cookie = response.cookie_pair();
            }
        }

        response
    }

    pub async fn request(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&mut self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None).await
    }

    pub async fn sign_up(&mut self, username: &str, email: &str, password: &str) -> TestResponse {
        let response = self
            .post(
                "/api/users/signup",
                json!({ "username": username, "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response
    }

    pub async fn session_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM tower_sessions")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    /// Expiry of the only stored session, as a Unix timestamp
    pub async fn session_expiry(&self) -> i64 {
        sqlx::query_scalar("SELECT expiry_date FROM tower_sessions")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    /// Move every stored session's expiry `seconds` closer to now
    pub async fn age_sessions(&self, seconds: i64) {
        sqlx::query("UPDATE tower_sessions SET expiry_date = expiry_date - ?")
            .bind(seconds)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    /// Push every stored session past its expiry
    pub async fn expire_sessions(&self) {
        sqlx::query("UPDATE tower_sessions SET expiry_date = 0")
            .execute(&self.pool)
            .await
            .unwrap();
    }
}
