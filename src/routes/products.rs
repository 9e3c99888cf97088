use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use crate::handlers::product::{
    list_products, get_product, create_product, update_product, delete_product,
    set_product_status, upload_product_images,
};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", get(get_product).put(update_product).delete(delete_product))
        .route("/products/{id}/status", patch(set_product_status))
        .route(
            "/products/{id}/images",
            post(upload_product_images).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route_layer(axum::middleware::from_fn(require_auth))
}
