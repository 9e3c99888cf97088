use axum::{
    extract::{Path, Query, State},
    response::Response,
    Extension, Json,
};
use http::Method;
use tracing::instrument;

use crate::dtos::customer::UpdateCustomerRequest;
use crate::dtos::listing::ListParams;
use crate::error::AppError;
use crate::handlers::relay::{forward, require_optional_text, NO_BODY};
use crate::listing::ListQuery;
use crate::middleware::auth::AuthContext;
use crate::state::AppState;

#[instrument(skip(state, auth))]
pub async fn list_customers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<ListParams>,
) -> Result<Response, AppError> {
    let query = ListQuery::try_from(params)?;
    forward(&state.upstream(&auth), Method::GET, "customers", &query.to_query_pairs(), NO_BODY).await
}

#[instrument(skip(state, auth))]
pub async fn get_customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    forward(&state.upstream(&auth), Method::GET, &format!("customers/{id}"), &[], NO_BODY).await
}

#[instrument(skip(state, auth, payload))]
pub async fn update_customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> Result<Response, AppError> {
    require_optional_text("firstName", payload.first_name.as_deref())?;
    require_optional_text("lastName", payload.last_name.as_deref())?;
    forward(&state.upstream(&auth), Method::PUT, &format!("customers/{id}"), &[], Some(&payload)).await
}
