use axum::{routing::get, Router};
use crate::handlers::brand::{list_brands, get_brand, create_brand, update_brand, delete_brand};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/brands", get(list_brands).post(create_brand))
        .route("/brands/{id}", get(get_brand).put(update_brand).delete(delete_brand))
        .route_layer(axum::middleware::from_fn(require_auth))
}
