pub mod auth;
pub mod brands;
pub mod categories;
pub mod customers;
pub mod partners;
pub mod prices;
pub mod products;

use axum::Router;
use crate::config::AppConfig;
use crate::state::AppState;

pub fn create_router(config: &AppConfig) -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(products::routes(config.upload_limit_bytes))
        .merge(categories::routes())
        .merge(brands::routes())
        .merge(partners::routes())
        .merge(customers::routes())
        .merge(prices::routes())
}
