//! Supervisor back office for an e-commerce backend.
//!
//! The crate is a client of the backend REST API. It provides the pricing
//! calculator and autosaving grid behind the bulk price editor, the paged
//! list controller shared by every list screen, and an HTTP relay that
//! forwards the console's requests upstream with the caller's bearer token.

pub mod api;
pub mod auth;
pub mod config;
pub mod dtos;
pub mod error;
pub mod grid;
pub mod handlers;
pub mod listing;
pub mod middleware;
pub mod models;
pub mod pricing;
pub mod routes;
pub mod state;

use axum::{http::HeaderValue, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Path prefix every route is served under.
pub const BASE_PATH: &str = "/supervisor";

pub fn build_app(state: AppState) -> Router {
    let api = routes::create_router(&state.config)
        .route("/", get(|| async { "Supervisor Console" }))
        .route("/health", get(health_check));

    let cors = match state
        .config
        .cors_origin
        .as_deref()
        .and_then(|origin| HeaderValue::from_str(origin).ok())
    {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true),
        None => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .nest(BASE_PATH, api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
