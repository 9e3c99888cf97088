use std::marker::PhantomData;
use std::slice;
use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::Form;
use http::{Method, StatusCode};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::api::error::{backend_message, ApiError};
use crate::api::{PageFetcher, PriceSource};
use crate::dtos::price::{BulkUpdateRequest, PricePatch};
use crate::listing::{ListQuery, Page};
use crate::models::price::PricePage;

/// Invoked whenever the backend answers 401, so the caller can send the
/// user back to the sign-in screen.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// Upstream status and JSON body of a forwarded request.
#[derive(Debug, Clone, PartialEq)]
pub struct Relayed {
    pub status: StatusCode,
    pub body: Value,
}

/// Bearer-token client for the backend REST API. Cloning shares the
/// connection pool.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    token: Option<Arc<str>>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            token: None,
            on_unauthorized: None,
        })
    }

    /// Same client, authenticated as `token`.
    pub fn with_token(&self, token: &str) -> Self {
        Self {
            token: Some(Arc::from(token)),
            ..self.clone()
        }
    }

    pub fn on_unauthorized(mut self, hook: UnauthorizedHook) -> Self {
        self.on_unauthorized = Some(hook);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("backend rejected credentials");
            if let Some(hook) = &self.on_unauthorized {
                hook();
            }
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.bytes().await?;
            let message = backend_message(&body)
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn relayed(response: Response) -> Result<Relayed, ApiError> {
        let status = response.status();
        let bytes = response.bytes().await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok(Relayed { status, body })
    }

    #[instrument(skip(self, query))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        let response = self.execute(self.request(Method::GET, path).query(query)).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    #[instrument(skip(self, query, body))]
    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<Relayed, ApiError> {
        let mut builder = self.request(method, path).query(query);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = self.execute(builder).await?;
        let relayed = Self::relayed(response).await?;
        debug!(status = relayed.status.as_u16(), "upstream responded");
        Ok(relayed)
    }

    #[instrument(skip(self, form))]
    pub async fn send_multipart(&self, path: &str, form: Form) -> Result<Relayed, ApiError> {
        let response = self
            .execute(self.request(Method::POST, path).multipart(form))
            .await?;
        Self::relayed(response).await
    }

    /// Paged list endpoint at `path`, usable with a list controller.
    pub fn list<T>(&self, path: &str) -> ResourceList<T> {
        ResourceList {
            client: self.clone(),
            path: path.to_string(),
            _item: PhantomData,
        }
    }
}

impl PriceSource for ApiClient {
    async fn fetch_page(&self, query: &ListQuery) -> Result<PricePage, ApiError> {
        self.get_json("prices", &query.to_query_pairs()).await
    }

    async fn save_patch(&self, patch: &PricePatch) -> Result<(), ApiError> {
        let body = BulkUpdateRequest {
            items: slice::from_ref(patch),
        };
        self.send_json(Method::PATCH, "prices/bulk-update", &[], Some(&body))
            .await
            .map(|_| ())
    }
}

/// A typed paged list endpoint.
pub struct ResourceList<T> {
    client: ApiClient,
    path: String,
    _item: PhantomData<fn() -> T>,
}

impl<T> PageFetcher for ResourceList<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Item = T;

    async fn fetch_page(&self, query: &ListQuery) -> Result<Page<T>, ApiError> {
        self.client.get_json(&self.path, &query.to_query_pairs()).await
    }
}
