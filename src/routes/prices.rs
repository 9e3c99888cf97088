use axum::{
    routing::{get, patch, post},
    Router,
};
use crate::handlers::price;
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/prices", get(price::list_prices))
        .route("/prices/preview", post(price::preview_price))
        .route("/prices/{id}", patch(price::update_price))
        .route_layer(axum::middleware::from_fn(require_auth))
}
