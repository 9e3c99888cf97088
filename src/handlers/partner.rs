use axum::{
    extract::{Path, Query, State},
    response::Response,
    Extension, Json,
};
use http::Method;
use tracing::{info, instrument};

use crate::dtos::listing::ListParams;
use crate::dtos::partner::{ApprovalRequest, CreatePartnerRequest, UpdatePartnerRequest};
use crate::error::AppError;
use crate::handlers::relay::{forward, require_optional_text, require_text, NO_BODY};
use crate::listing::ListQuery;
use crate::middleware::auth::AuthContext;
use crate::state::AppState;

fn validate_email(email: &str) -> Result<(), AppError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::validation("Email address is invalid"));
    }
    Ok(())
}

fn validate_tax_number(tax_number: &str) -> Result<(), AppError> {
    let digits = tax_number.trim();
    if !(10..=11).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::validation("Tax number must be 10 or 11 digits"));
    }
    Ok(())
}

#[instrument(skip(state, auth))]
pub async fn list_partners(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<ListParams>,
) -> Result<Response, AppError> {
    let query = ListQuery::try_from(params)?;
    forward(&state.upstream(&auth), Method::GET, "partners", &query.to_query_pairs(), NO_BODY).await
}

#[instrument(skip(state, auth))]
pub async fn get_partner(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    forward(&state.upstream(&auth), Method::GET, &format!("partners/{id}"), &[], NO_BODY).await
}

#[instrument(skip(state, auth, payload))]
pub async fn create_partner(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreatePartnerRequest>,
) -> Result<Response, AppError> {
    require_text("companyName", &payload.company_name)?;
    validate_tax_number(&payload.tax_number)?;
    validate_email(&payload.email)?;
    forward(&state.upstream(&auth), Method::POST, "partners", &[], Some(&payload)).await
}

#[instrument(skip(state, auth, payload))]
pub async fn update_partner(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePartnerRequest>,
) -> Result<Response, AppError> {
    require_optional_text("companyName", payload.company_name.as_deref())?;
    if let Some(tax_number) = &payload.tax_number {
        validate_tax_number(tax_number)?;
    }
    if let Some(email) = &payload.email {
        validate_email(email)?;
    }
    forward(&state.upstream(&auth), Method::PUT, &format!("partners/{id}"), &[], Some(&payload)).await
}

// PATCH /partners/{id}/approval - approve or reject a dealer application
#[instrument(skip(state, auth, payload))]
pub async fn review_partner(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<ApprovalRequest>,
) -> Result<Response, AppError> {
    if !payload.approved && payload.note.as_deref().map_or(true, |n| n.trim().is_empty()) {
        return Err(AppError::validation("A note is required when rejecting a partner"));
    }
    let response = forward(
        &state.upstream(&auth),
        Method::PATCH,
        &format!("partners/{id}/approval"),
        &[],
        Some(&payload),
    )
    .await?;
    info!(partner_id = id, approved = payload.approved, reviewer = ?auth.username, "partner reviewed");
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_needs_user_and_dotted_domain() {
        assert!(validate_email("bayi@ornek.com.tr").is_ok());
        assert!(validate_email("bayi@localhost").is_err());
        assert!(validate_email("@ornek.com").is_err());
        assert!(validate_email("no-at-sign").is_err());
    }

    #[test]
    fn tax_number_is_ten_or_eleven_digits() {
        assert!(validate_tax_number("1234567890").is_ok());
        assert!(validate_tax_number("12345678901").is_ok());
        assert!(validate_tax_number("123456789").is_err());
        assert!(validate_tax_number("12345abcde").is_err());
    }
}
