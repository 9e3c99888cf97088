//! Access to the upstream REST API, the system of record.

pub mod client;
pub mod error;

use std::future::Future;

use crate::dtos::price::PricePatch;
use crate::listing::{ListQuery, Page};
use crate::models::price::PricePage;

pub use client::{ApiClient, Relayed, UnauthorizedHook};
pub use error::ApiError;

/// Data source and save target of the bulk price grid.
pub trait PriceSource: Send + Sync + 'static {
    fn fetch_page(&self, query: &ListQuery) -> impl Future<Output = Result<PricePage, ApiError>> + Send;

    fn save_patch(&self, patch: &PricePatch) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Data source of a generic paged list screen.
pub trait PageFetcher: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    fn fetch_page(
        &self,
        query: &ListQuery,
    ) -> impl Future<Output = Result<Page<Self::Item>, ApiError>> + Send;
}
