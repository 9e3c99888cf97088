// Shared plumbing for handlers that forward to the backend.
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use http::Method;
use serde::Serialize;

use crate::api::ApiClient;
use crate::error::AppError;

/// Forwards a JSON request upstream and relays status and body back.
pub async fn forward<B: Serialize + ?Sized>(
    client: &ApiClient,
    method: Method,
    path: &str,
    query: &[(String, String)],
    body: Option<&B>,
) -> Result<Response, AppError> {
    let relayed = client.send_json(method, path, query, body).await?;
    Ok(into_response(relayed.status, relayed.body))
}

pub fn into_response(status: StatusCode, body: serde_json::Value) -> Response {
    if status == StatusCode::NO_CONTENT || body.is_null() {
        return status.into_response();
    }
    (status, Json(body)).into_response()
}

pub fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(())
}

pub fn require_optional_text(field: &str, value: Option<&str>) -> Result<(), AppError> {
    match value {
        Some(v) => require_text(field, v),
        None => Ok(()),
    }
}

/// `GET` without a body.
pub const NO_BODY: Option<&()> = None;
