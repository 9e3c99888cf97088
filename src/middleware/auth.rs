use axum::{response::{Response, IntoResponse}};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use chrono::{DateTime, Utc};
use crate::auth::jwt::read_claims;
use crate::config::TOKEN_COOKIE;
use serde::Serialize;

#[derive(Clone, Debug)]
pub struct AuthContext {
    pub token: String,
    pub username: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct ErrorBody { error: String, code: &'static str }

use axum::http::Request;

pub async fn require_auth(mut req: Request<axum::body::Body>, next: Next) -> Response {
    let token = match bearer_token(req.headers()) {
        Some(t) => t,
        None => return unauthorized("Missing bearer token"),
    };

    let claims = read_claims(&token);
    if claims.as_ref().is_some_and(|c| c.is_expired(Utc::now())) {
        return unauthorized("Session expired");
    }

    // Attach context
    req.extensions_mut().insert(AuthContext {
        username: claims.as_ref().and_then(|c| c.display_name()),
        expires_at: claims.as_ref().and_then(|c| c.expires_at()),
        token,
    });

    next.run(req).await
}

/// Token from `Authorization: Bearer <token>`, falling back to the session
/// cookie set at login.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn unauthorized(msg: &str) -> Response {
    let body = axum::Json(ErrorBody { error: msg.to_string(), code: "unauthorized" });
    (StatusCode::UNAUTHORIZED, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn prefers_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("supervisor_token=zzz"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn falls_back_to_session_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; supervisor_token=xyz"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert_eq!(bearer_token(&headers), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
