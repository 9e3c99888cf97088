#![allow(dead_code)]

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use supervisor_console::{build_app, config::AppConfig, state::AppState};
use tower::ServiceExt;
use tracing_subscriber::EnvFilter;
use wiremock::MockServer;

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

pub fn test_config(server: &MockServer) -> AppConfig {
    AppConfig {
        api_base_url: server.uri(),
        host: [127, 0, 0, 1].into(),
        port: 0,
        request_timeout: Duration::from_secs(5),
        cookie_secure: false,
        cors_origin: None,
        upload_limit_bytes: 20 * 1024 * 1024,
    }
}

pub fn app(server: &MockServer) -> Router {
    app_with(test_config(server))
}

pub fn app_with(config: AppConfig) -> Router {
    init_test_tracing();
    build_app(AppState::new(config).unwrap())
}

pub fn token_expiring_at(exp: DateTime<Utc>) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        &json!({ "sub": 1, "username": "supervisor", "exp": exp.timestamp() }),
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .unwrap()
}

/// Same claims under an RS256 header; the signature is never checked locally.
pub fn rs256_token_expiring_at(exp: DateTime<Utc>) -> String {
    let token = token_expiring_at(exp);
    let (_, rest) = token.split_once('.').unwrap();
    format!("eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.{rest}")
}

pub fn valid_token() -> String {
    token_expiring_at(Utc::now() + chrono::Duration::hours(8))
}

pub async fn send(app: Router, request: Request<Body>) -> (Response<Body>, Value) {
    let response = app.oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (Response::from_parts(parts, Body::empty()), value)
}

pub fn authed(method: &str, uri: &str, token: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
}
