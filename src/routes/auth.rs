use axum::{Router, routing::{post, get}, middleware};
use crate::state::AppState;
use crate::handlers::auth::{login, logout, me};
use crate::middleware::auth::require_auth;

pub fn routes() -> Router<AppState> {
    let open = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout));

    let protected = Router::new()
        .route("/auth/me", get(me))
        .layer(middleware::from_fn(require_auth));

    open.merge(protected)
}
