//! Sale price and dealer margin derivation.
//!
//! Everything here is synchronous and side-effect free. A missing input never
//! panics: it collapses the values that depend on it to `None`.

use crate::models::price::{PriceRow, RatioSet};

/// Editable cost inputs of a row.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostInputs {
    pub cost_price: Option<f64>,
    pub profit_ratio: Option<f64>,
    pub logistic_cost: Option<f64>,
    pub porterage_cost: Option<f64>,
    pub other_price1: Option<f64>,
}

impl From<&PriceRow> for CostInputs {
    fn from(row: &PriceRow) -> Self {
        Self {
            cost_price: row.cost_price,
            profit_ratio: row.profit_ratio,
            logistic_cost: row.logistic_cost,
            porterage_cost: row.porterage_cost,
            other_price1: row.other_price1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DerivedPrices {
    pub price: Option<f64>,
    pub cc_single_price: Option<f64>,
    pub cc_installment_price: Option<f64>,
    pub dealer_cash_margin_pct: Option<f64>,
    pub dealer_cc_single_margin_pct: Option<f64>,
    pub dealer_cc_installment_margin_pct: Option<f64>,
}

/// Cash sale price: cost plus profit percent plus logistic and porterage costs.
///
/// A missing or zero cost means the row is not priced yet.
pub fn calc_price(inputs: &CostInputs) -> Option<f64> {
    let cost = inputs.cost_price.filter(|c| *c != 0.0)?;
    let profit = inputs.profit_ratio.unwrap_or(0.0);
    let logistic = inputs.logistic_cost.unwrap_or(0.0);
    let porterage = inputs.porterage_cost.unwrap_or(0.0);

    Some(((100.0 + profit) * cost) / 100.0 + logistic + porterage)
}

/// Dealer margin of `other_price1` relative to `base`, in percent.
pub fn margin_pct(other_price1: Option<f64>, base: Option<f64>) -> Option<f64> {
    let other = other_price1?;
    let base = base.filter(|b| *b != 0.0 && b.is_finite())?;
    Some((other / base - 1.0) * 100.0)
}

pub fn derive(inputs: &CostInputs, ratios: &RatioSet) -> DerivedPrices {
    let price = calc_price(inputs);
    let cc_single_price = price.map(|p| p * ratios.cc_single_ratio_value);
    let cc_installment_price = price.map(|p| p * ratios.cc_installment_ratio_value);

    DerivedPrices {
        price,
        cc_single_price,
        cc_installment_price,
        dealer_cash_margin_pct: margin_pct(inputs.other_price1, price),
        dealer_cc_single_margin_pct: margin_pct(inputs.other_price1, cc_single_price),
        dealer_cc_installment_margin_pct: margin_pct(inputs.other_price1, cc_installment_price),
    }
}

impl PriceRow {
    /// Overwrites the derived columns from the current editable values.
    pub fn recompute(&mut self, ratios: &RatioSet) {
        let derived = derive(&CostInputs::from(&*self), ratios);
        self.price = derived.price;
        self.cc_single_price = derived.cc_single_price;
        self.cc_installment_price = derived.cc_installment_price;
        self.dealer_cash_margin_pct = derived.dealer_cash_margin_pct;
        self.dealer_cc_single_margin_pct = derived.dealer_cc_single_margin_pct;
        self.dealer_cc_installment_margin_pct = derived.dealer_cc_installment_margin_pct;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CostInputs {
        CostInputs {
            cost_price: Some(100.0),
            profit_ratio: Some(20.0),
            logistic_cost: Some(5.0),
            porterage_cost: Some(3.0),
            other_price1: Some(150.0),
        }
    }

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn cash_price_adds_profit_and_costs() {
        assert_eq!(calc_price(&sample()), Some(144.0));
    }

    #[test]
    fn missing_optional_inputs_count_as_zero() {
        let inputs = CostInputs {
            cost_price: Some(80.0),
            ..CostInputs::default()
        };
        assert_eq!(calc_price(&inputs), Some(80.0));
    }

    #[test]
    fn price_is_none_exactly_when_cost_is_missing_or_zero() {
        for cost in [None, Some(0.0)] {
            let inputs = CostInputs {
                cost_price: cost,
                ..sample()
            };
            assert_eq!(calc_price(&inputs), None);
        }
        for cost in [Some(0.01), Some(-3.0), Some(1e6)] {
            let inputs = CostInputs {
                cost_price: cost,
                ..sample()
            };
            assert!(calc_price(&inputs).is_some());
        }
    }

    #[test]
    fn channel_prices_are_price_times_ratio() {
        let ratios = RatioSet {
            cc_single_ratio_value: 1.03,
            cc_installment_ratio_value: 1.12,
        };
        let derived = derive(&sample(), &ratios);
        let price = derived.price.unwrap();

        assert_eq!(derived.cc_single_price, Some(price * 1.03));
        assert_eq!(derived.cc_installment_price, Some(price * 1.12));
        assert!(close(derived.cc_single_price, 148.32));
    }

    #[test]
    fn cash_margin_is_relative_to_sale_price() {
        let derived = derive(&sample(), &RatioSet::default());
        assert!(close(derived.dealer_cash_margin_pct, 4.166_666_666_666_667));
        assert_eq!(
            derived.dealer_cash_margin_pct,
            derived.dealer_cc_single_margin_pct
        );
    }

    #[test]
    fn margin_guards_against_zero_and_missing_values() {
        assert_eq!(margin_pct(Some(10.0), Some(0.0)), None);
        assert_eq!(margin_pct(None, Some(10.0)), None);
        assert_eq!(margin_pct(Some(10.0), None), None);
        assert_eq!(margin_pct(Some(10.0), Some(f64::INFINITY)), None);
        assert!(close(margin_pct(Some(90.0), Some(100.0)), -10.0));
    }

    #[test]
    fn missing_cost_cascades_to_every_derived_value() {
        let inputs = CostInputs {
            cost_price: None,
            ..sample()
        };
        assert_eq!(derive(&inputs, &RatioSet::default()), DerivedPrices::default());
    }

    #[test]
    fn recompute_overwrites_stale_derived_columns() {
        let mut row = PriceRow {
            price_id: 1,
            cost_price: Some(100.0),
            profit_ratio: Some(20.0),
            logistic_cost: Some(5.0),
            porterage_cost: Some(3.0),
            price: Some(1.0),
            dealer_cash_margin_pct: Some(99.0),
            ..PriceRow::default()
        };
        row.recompute(&RatioSet::default());

        assert_eq!(row.price, Some(144.0));
        assert_eq!(row.cc_single_price, Some(144.0));
        assert_eq!(row.dealer_cash_margin_pct, None);
    }
}
