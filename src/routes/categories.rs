use axum::{routing::get, Router};
use crate::handlers::category::{
    list_categories, get_category, create_category, update_category, delete_category,
};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", get(get_category).put(update_category).delete(delete_category))
        .route_layer(axum::middleware::from_fn(require_auth))
}
