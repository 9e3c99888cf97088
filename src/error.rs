// src/error.rs
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use tracing::error;

use crate::api::ApiError;

#[derive(Debug)]
pub enum AppError {
    Unauthorized(String),
    NotFound(String),
    ValidationError(String),
    /// Error reported by the backend, relayed with its own status.
    Upstream { status: StatusCode, message: String },
    PayloadTooLarge(String),
    BadGateway(String),
}

impl AppError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        AppError::BadGateway(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upstream { status, message } => (status, message),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        let message = err.user_message();
        match err {
            ApiError::Unauthorized => AppError::Unauthorized(message),
            ApiError::Backend { status: 404, .. } => AppError::NotFound(message),
            ApiError::Backend { status, .. } => AppError::Upstream {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
            },
            ApiError::Transport(e) => {
                error!(error = %e, "upstream unreachable");
                AppError::BadGateway(message)
            }
            ApiError::Parse(e) => {
                error!(error = %e, "upstream sent malformed JSON");
                AppError::BadGateway(message)
            }
        }
    }
}
