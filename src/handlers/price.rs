use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{info, instrument};

use crate::api::PriceSource;
use crate::dtos::listing::ListParams;
use crate::dtos::price::{
    FormattedPrices, PricePatch, PricePreviewRequest, PricePreviewResponse, UpdatePriceRequest,
};
use crate::error::AppError;
use crate::listing::ListQuery;
use crate::middleware::auth::AuthContext;
use crate::models::price::{PriceField, PricePage, RatioSet};
use crate::pricing::{derive, format_money, format_percent, CostInputs};
use crate::state::AppState;

// GET /prices - bulk grid page, derived columns recomputed locally
#[instrument(skip(state, auth))]
pub async fn list_prices(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<ListParams>,
) -> Result<Json<PricePage>, AppError> {
    let query = ListQuery::try_from(params)?;
    let mut page = state.upstream(&auth).fetch_page(&query).await?;

    let ratios = page.ratios();
    for row in &mut page.items {
        row.recompute(&ratios);
    }
    Ok(Json(page))
}

// PATCH /prices/{id} - single row save
#[instrument(skip(state, auth, fields))]
pub async fn update_price(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(fields): Json<UpdatePriceRequest>,
) -> Result<StatusCode, AppError> {
    if fields.is_empty() {
        return Err(AppError::validation("Nothing to update"));
    }
    for (field, value) in &fields {
        validate_field(*field, *value)?;
    }

    let patch = PricePatch { price_id: id, fields };
    state.upstream(&auth).save_patch(&patch).await?;
    info!(price_id = id, fields = patch.fields.len(), user = ?auth.username, "price updated");
    Ok(StatusCode::NO_CONTENT)
}

// POST /prices/preview - calculator only, nothing is saved
#[instrument(skip(payload))]
pub async fn preview_price(Json(payload): Json<PricePreviewRequest>) -> Result<Json<PricePreviewResponse>, AppError> {
    let inputs = CostInputs {
        cost_price: payload.cost_price,
        profit_ratio: payload.profit_ratio,
        logistic_cost: payload.logistic_cost,
        porterage_cost: payload.porterage_cost,
        other_price1: payload.other_price1,
    };
    let defaults = RatioSet::default();
    let ratios = RatioSet {
        cc_single_ratio_value: payload.cc_single_ratio_value.unwrap_or(defaults.cc_single_ratio_value),
        cc_installment_ratio_value: payload
            .cc_installment_ratio_value
            .unwrap_or(defaults.cc_installment_ratio_value),
    };
    if ratios.cc_single_ratio_value <= 0.0 || ratios.cc_installment_ratio_value <= 0.0 {
        return Err(AppError::validation("Card ratios must be positive"));
    }

    let d = derive(&inputs, &ratios);
    Ok(Json(PricePreviewResponse {
        price: d.price,
        cc_single_price: d.cc_single_price,
        cc_installment_price: d.cc_installment_price,
        dealer_cash_margin_pct: d.dealer_cash_margin_pct,
        dealer_cc_single_margin_pct: d.dealer_cc_single_margin_pct,
        dealer_cc_installment_margin_pct: d.dealer_cc_installment_margin_pct,
        formatted: FormattedPrices {
            price: format_money(d.price),
            cc_single_price: format_money(d.cc_single_price),
            cc_installment_price: format_money(d.cc_installment_price),
            dealer_cash_margin_pct: format_percent(d.dealer_cash_margin_pct),
            dealer_cc_single_margin_pct: format_percent(d.dealer_cc_single_margin_pct),
            dealer_cc_installment_margin_pct: format_percent(d.dealer_cc_installment_margin_pct),
        },
    }))
}

fn validate_field(field: PriceField, value: Option<f64>) -> Result<(), AppError> {
    let Some(v) = value else {
        return Ok(());
    };
    match field {
        PriceField::ProfitRatio if v <= -100.0 => {
            Err(AppError::validation("Profit ratio must be greater than -100"))
        }
        PriceField::ProfitRatio => Ok(()),
        _ if v < 0.0 => Err(AppError::validation(format!("{} cannot be negative", field.as_str()))),
        _ => Ok(()),
    }
}
