use serde::{Deserialize, Serialize};

pub type PriceId = i64;

/// Multipliers converting a base price into card channel prices.
///
/// Supplied by the server with every price page and constant while that page
/// is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatioSet {
    pub cc_single_ratio_value: f64,
    pub cc_installment_ratio_value: f64,
}

impl Default for RatioSet {
    fn default() -> Self {
        Self {
            cc_single_ratio_value: 1.0,
            cc_installment_ratio_value: 1.0,
        }
    }
}

/// One product-at-warehouse price record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRow {
    pub price_id: PriceId,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_code: Option<String>,
    #[serde(default)]
    pub warehouse_id: Option<i64>,
    #[serde(default)]
    pub warehouse_name: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub tax_ratio: Option<f64>,

    // editable
    #[serde(default)]
    pub cost_price: Option<f64>,
    #[serde(default)]
    pub profit_ratio: Option<f64>,
    #[serde(default)]
    pub logistic_cost: Option<f64>,
    #[serde(default)]
    pub porterage_cost: Option<f64>,
    #[serde(default)]
    pub other_price1: Option<f64>,

    // derived, see `pricing::calculator`
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub cc_single_price: Option<f64>,
    #[serde(default)]
    pub cc_installment_price: Option<f64>,
    #[serde(default)]
    pub dealer_cash_margin_pct: Option<f64>,
    #[serde(default)]
    pub dealer_cc_single_margin_pct: Option<f64>,
    #[serde(default)]
    pub dealer_cc_installment_margin_pct: Option<f64>,
}

/// The user-editable cost fields of a [`PriceRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PriceField {
    CostPrice,
    ProfitRatio,
    LogisticCost,
    PorterageCost,
    OtherPrice1,
}

impl PriceField {
    pub const ALL: [PriceField; 5] = [
        PriceField::CostPrice,
        PriceField::ProfitRatio,
        PriceField::LogisticCost,
        PriceField::PorterageCost,
        PriceField::OtherPrice1,
    ];

    pub fn set(self, row: &mut PriceRow, value: Option<f64>) {
        let slot = match self {
            PriceField::CostPrice => &mut row.cost_price,
            PriceField::ProfitRatio => &mut row.profit_ratio,
            PriceField::LogisticCost => &mut row.logistic_cost,
            PriceField::PorterageCost => &mut row.porterage_cost,
            PriceField::OtherPrice1 => &mut row.other_price1,
        };
        *slot = value;
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PriceField::CostPrice => "costPrice",
            PriceField::ProfitRatio => "profitRatio",
            PriceField::LogisticCost => "logisticCost",
            PriceField::PorterageCost => "porterageCost",
            PriceField::OtherPrice1 => "otherPrice1",
        }
    }
}

/// One page of price rows as returned by the backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePage {
    #[serde(default)]
    pub items: Vec<PriceRow>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub cc_single_ratio_value: Option<f64>,
    #[serde(default)]
    pub cc_installment_ratio_value: Option<f64>,
}

fn first_page() -> u32 {
    1
}

impl PricePage {
    /// Ratios for this page; a missing multiplier counts as 1.
    pub fn ratios(&self) -> RatioSet {
        RatioSet {
            cc_single_ratio_value: self.cc_single_ratio_value.unwrap_or(1.0),
            cc_installment_ratio_value: self.cc_installment_ratio_value.unwrap_or(1.0),
        }
    }
}
