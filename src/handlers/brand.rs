use axum::{
    extract::{Path, Query, State},
    response::Response,
    Extension, Json,
};
use http::Method;
use tracing::instrument;

use crate::dtos::catalog::{CreateBrandRequest, UpdateBrandRequest};
use crate::dtos::listing::ListParams;
use crate::error::AppError;
use crate::handlers::relay::{forward, require_optional_text, require_text, NO_BODY};
use crate::listing::ListQuery;
use crate::middleware::auth::AuthContext;
use crate::state::AppState;

#[instrument(skip(state, auth))]
pub async fn list_brands(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<ListParams>,
) -> Result<Response, AppError> {
    let query = ListQuery::try_from(params)?;
    forward(&state.upstream(&auth), Method::GET, "brands", &query.to_query_pairs(), NO_BODY).await
}

#[instrument(skip(state, auth))]
pub async fn get_brand(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    forward(&state.upstream(&auth), Method::GET, &format!("brands/{id}"), &[], NO_BODY).await
}

#[instrument(skip(state, auth, payload))]
pub async fn create_brand(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateBrandRequest>,
) -> Result<Response, AppError> {
    require_text("name", &payload.name)?;
    forward(&state.upstream(&auth), Method::POST, "brands", &[], Some(&payload)).await
}

#[instrument(skip(state, auth, payload))]
pub async fn update_brand(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateBrandRequest>,
) -> Result<Response, AppError> {
    require_optional_text("name", payload.name.as_deref())?;
    forward(&state.upstream(&auth), Method::PUT, &format!("brands/{id}"), &[], Some(&payload)).await
}

#[instrument(skip(state, auth))]
pub async fn delete_brand(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    forward(&state.upstream(&auth), Method::DELETE, &format!("brands/{id}"), &[], NO_BODY).await
}
