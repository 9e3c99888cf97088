use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    response::Response,
    Extension, Json,
};
use reqwest::multipart::{Form, Part};
use http::Method;
use tracing::{info, instrument, warn};

use crate::dtos::catalog::{CreateProductRequest, StatusRequest, UpdateProductRequest};
use crate::dtos::listing::ListParams;
use crate::error::AppError;
use crate::handlers::relay::{forward, into_response, require_optional_text, require_text, NO_BODY};
use crate::listing::ListQuery;
use crate::middleware::auth::AuthContext;
use crate::state::AppState;

// GET /products
#[instrument(skip(state, auth))]
pub async fn list_products(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<ListParams>,
) -> Result<Response, AppError> {
    let query = ListQuery::try_from(params)?;
    forward(&state.upstream(&auth), Method::GET, "products", &query.to_query_pairs(), NO_BODY).await
}

// GET /products/{id}
#[instrument(skip(state, auth))]
pub async fn get_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    forward(&state.upstream(&auth), Method::GET, &format!("products/{id}"), &[], NO_BODY).await
}

// POST /products
#[instrument(skip(state, auth, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<Response, AppError> {
    require_text("name", &payload.name)?;
    require_text("code", &payload.code)?;
    if payload.tax_ratio.is_some_and(|t| t < 0.0) {
        return Err(AppError::validation("Tax ratio cannot be negative"));
    }
    forward(&state.upstream(&auth), Method::POST, "products", &[], Some(&payload)).await
}

// PUT /products/{id}
#[instrument(skip(state, auth, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Response, AppError> {
    require_optional_text("name", payload.name.as_deref())?;
    require_optional_text("code", payload.code.as_deref())?;
    forward(&state.upstream(&auth), Method::PUT, &format!("products/{id}"), &[], Some(&payload)).await
}

// DELETE /products/{id}
#[instrument(skip(state, auth))]
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    forward(&state.upstream(&auth), Method::DELETE, &format!("products/{id}"), &[], NO_BODY).await
}

// PATCH /products/{id}/status
#[instrument(skip(state, auth))]
pub async fn set_product_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusRequest>,
) -> Result<Response, AppError> {
    forward(&state.upstream(&auth), Method::PATCH, &format!("products/{id}/status"), &[], Some(&payload)).await
}

// POST /products/{id}/images - multipart, image parts only
#[instrument(skip(state, auth, multipart))]
pub async fn upload_product_images(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = Form::new();
    let mut files = 0usize;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(upload_error)?
    {
        let name = field.name().unwrap_or("files").to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(upload_error)?;

        let Some(file_name) = file_name else {
            // plain form value
            form = form.text(name, String::from_utf8_lossy(&data).into_owned());
            continue;
        };

        let content_type = content_type.unwrap_or_default();
        if !content_type.starts_with("image/") {
            return Err(AppError::validation(format!("{file_name} is not an image")));
        }
        let part = Part::bytes(data.to_vec())
            .file_name(file_name)
            .mime_str(&content_type)
            .map_err(|_| AppError::validation("Invalid content type"))?;
        form = form.part(name, part);
        files += 1;
    }

    if files == 0 {
        return Err(AppError::validation("At least one image is required"));
    }

    let relayed = state
        .upstream(&auth)
        .send_multipart(&format!("products/{id}/images"), form)
        .await?;
    info!(product_id = id, files, "product images uploaded");
    Ok(into_response(relayed.status, relayed.body))
}

fn upload_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(error = %err, "image upload over the size limit");
        return AppError::PayloadTooLarge("Upload is too large".to_string());
    }
    AppError::validation(format!("Malformed upload: {err}"))
}
