use axum::{
    routing::{get, patch},
    Router,
};
use crate::handlers::partner;
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        // dealer onboarding
        .route("/partners", get(partner::list_partners).post(partner::create_partner))
        .route("/partners/{id}", get(partner::get_partner).put(partner::update_partner))
        .route("/partners/{id}/approval", patch(partner::review_partner))
        .route_layer(axum::middleware::from_fn(require_auth))
}
