use thiserror::Error;

const GENERIC_MESSAGE: &str = "Unexpected response from server";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("session expired or not authorized")]
    Unauthorized,

    /// Validation or business error reported by the backend.
    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("could not parse backend response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// Text suitable for an inline error or page banner.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => "Could not reach the server, please try again".to_string(),
            ApiError::Unauthorized => "Your session has expired, please sign in again".to_string(),
            ApiError::Backend { message, .. } => message.clone(),
            ApiError::Parse(_) => GENERIC_MESSAGE.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Pulls a human readable message out of an error body.
///
/// Backends disagree on the key, so `message`, `error`, `detail` and the
/// first entry of `errors` are tried in that order.
pub fn backend_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    for key in ["message", "error", "detail"] {
        if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
            if !text.trim().is_empty() {
                return Some(text.to_string());
            }
        }
    }
    let first = value.get("errors")?.as_array()?.first()?;
    first
        .as_str()
        .or_else(|| first.get("message").and_then(|m| m.as_str()))
        .map(str::to_string)
}
