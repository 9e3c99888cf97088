use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::price::{PriceField, PriceId, PriceRow};

/// Partial update of one price row. Only fields present in `fields` are
/// sent; a present `None` clears the value upstream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePatch {
    pub price_id: PriceId,
    #[serde(flatten)]
    pub fields: BTreeMap<PriceField, Option<f64>>,
}

impl PricePatch {
    pub fn new(price_id: PriceId) -> Self {
        Self {
            price_id,
            fields: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, field: PriceField, value: Option<f64>) {
        self.fields.insert(field, value);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Writes the patched fields into `row`. Derived columns are left to the
    /// caller to recompute.
    pub fn apply_to(&self, row: &mut PriceRow) {
        for (field, value) in &self.fields {
            field.set(row, *value);
        }
    }
}

/// Body of `PATCH prices/bulk-update`.
#[derive(Debug, Serialize)]
pub struct BulkUpdateRequest<'a> {
    pub items: &'a [PricePatch],
}

/// Body accepted by the relay for a single row update.
pub type UpdatePriceRequest = BTreeMap<PriceField, Option<f64>>;

/// Inputs for an ad-hoc pricing calculation that is not saved anywhere.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePreviewRequest {
    pub cost_price: Option<f64>,
    pub profit_ratio: Option<f64>,
    pub logistic_cost: Option<f64>,
    pub porterage_cost: Option<f64>,
    pub other_price1: Option<f64>,
    pub cc_single_ratio_value: Option<f64>,
    pub cc_installment_ratio_value: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePreviewResponse {
    pub price: Option<f64>,
    pub cc_single_price: Option<f64>,
    pub cc_installment_price: Option<f64>,
    pub dealer_cash_margin_pct: Option<f64>,
    pub dealer_cc_single_margin_pct: Option<f64>,
    pub dealer_cc_installment_margin_pct: Option<f64>,
    pub formatted: FormattedPrices,
}

/// Display strings of a preview, formatted the way the grid shows them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedPrices {
    pub price: String,
    pub cc_single_price: String,
    pub cc_installment_price: String,
    pub dealer_cash_margin_pct: String,
    pub dealer_cc_single_margin_pct: String,
    pub dealer_cc_installment_margin_pct: String,
}
