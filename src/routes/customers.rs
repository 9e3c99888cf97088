use axum::{routing::get, Router};
use crate::handlers::customer::{list_customers, get_customer, update_customer};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers))
        .route("/customers/{id}", get(get_customer).put(update_customer))
        .route_layer(axum::middleware::from_fn(require_auth))
}
