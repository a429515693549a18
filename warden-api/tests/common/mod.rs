//! Common test utilities for API tests
//!
//! Builds the full router over an in-memory credential store with cheap
//! Argon2 parameters, so the HTTP surface can be exercised without a
//! database.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use std::sync::Arc;
use tower::Service as _;
use warden_api::app::{build_router, AppState};
use warden_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use warden_shared::auth::password::HashingConfig;
use warden_shared::store::memory::MemoryCredentialStore;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing the router and its backing store
pub struct TestContext {
    pub app: axum::Router,
    pub store: Arc<MemoryCredentialStore>,
    pub state: AppState,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            production: false,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expire_minutes: 30,
        },
        hashing: HashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
    }
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryCredentialStore::new());
        let state = AppState::new(store.clone(), test_config()).expect("valid test config");
        let app = build_router(state.clone());

        Self { app, store, state }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().call(request).await.unwrap()
    }

    pub async fn register(&self, username: &str, password: &str) -> Response<Body> {
        let body = serde_json::json!({ "username": username, "password": password });
        self.send(
            Request::builder()
                .method("POST")
                .uri("/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Response<Body> {
        let form = format!(
            "grant_type=password&username={}&password={}",
            encode(username),
            encode(password)
        );
        self.send(
            Request::builder()
                .method("POST")
                .uri("/token")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
    }

    pub async fn me(&self, authorization: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri("/me");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Registers and logs in, returning the access token
    pub async fn token_for(&self, username: &str, password: &str) -> String {
        self.register(username, password).await;
        let json = body_json(self.login(username, password).await).await;
        json["access_token"].as_str().unwrap().to_string()
    }
}

/// Percent-encodes the characters test credentials use
fn encode(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' => c.to_string(),
            _ => format!("%{:02X}", c as u32),
        })
        .collect()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
