use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use http::Method;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::api::ApiError;
use crate::auth::jwt::read_claims;
use crate::config::TOKEN_COOKIE;
use crate::dtos::auth::{LoginRequest, LoginResponse, SessionResponse};
use crate::error::AppError;
use crate::handlers::relay::{require_text, NO_BODY};
use crate::middleware::auth::AuthContext;
use crate::state::AppState;

/// Token field names seen in backend login responses.
fn extract_token(body: &Value) -> Option<String> {
    ["accessToken", "access_token", "token"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .or_else(|| body.get("data").and_then(|d| d.get("token")).and_then(Value::as_str))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn session_cookie(token: &str, max_age: Option<i64>, secure: bool) -> String {
    let mut cookie = format!("{TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    if let Some(secs) = max_age {
        cookie.push_str(&format!("; Max-Age={}", secs.max(0)));
    }
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

// POST /auth/login
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    require_text("username", &payload.username)?;
    if payload.password.is_empty() {
        return Err(AppError::validation("Password required"));
    }

    let relayed = state
        .api
        .send_json(Method::POST, "auth/login", &[], Some(&payload))
        .await
        .map_err(|e| match e {
            ApiError::Unauthorized => AppError::unauthorized("Invalid username or password"),
            other => other.into(),
        })?;

    let token = extract_token(&relayed.body)
        .ok_or_else(|| AppError::bad_gateway("Login response did not include a token"))?;

    let claims = read_claims(&token);
    let expires_at = claims.as_ref().and_then(|c| c.expires_at());
    let max_age = expires_at.map(|exp| (exp - Utc::now()).num_seconds());
    let cookie = session_cookie(&token, max_age, state.config.cookie_secure);

    info!("supervisor signed in");
    let body = LoginResponse {
        access_token: token,
        token_type: "Bearer",
        username: claims
            .and_then(|c| c.display_name())
            .or_else(|| Some(payload.username.clone())),
        expires_at: expires_at.map(|t| t.to_rfc3339()),
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

// POST /auth/logout
pub async fn logout(State(state): State<AppState>) -> Response {
    let cookie = session_cookie("", Some(0), state.config.cookie_secure);
    ([(header::SET_COOKIE, cookie)], StatusCode::NO_CONTENT).into_response()
}

// GET /auth/me
#[instrument(skip(state, auth))]
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<SessionResponse>, AppError> {
    let relayed = state
        .upstream(&auth)
        .send_json(Method::GET, "auth/me", &[], NO_BODY)
        .await
        .inspect_err(|e| warn!(error = %e, "profile lookup failed"))?;

    Ok(Json(SessionResponse {
        username: auth.username,
        expires_at: auth.expires_at.map(|t| t.to_rfc3339()),
        profile: relayed.body,
    }))
}
