use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::AppConfig;
use crate::middleware::auth::AuthContext;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Unauthenticated client; use [`AppState::upstream`] for user requests.
    pub api: ApiClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api_base_url, config.request_timeout)?;
        Ok(Self {
            config: Arc::new(config),
            api,
        })
    }

    /// Client carrying the caller's bearer token.
    pub fn upstream(&self, auth: &AuthContext) -> ApiClient {
        self.api.with_token(&auth.token)
    }
}
