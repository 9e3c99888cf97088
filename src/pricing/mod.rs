pub mod calculator;
pub mod format;

pub use calculator::{calc_price, derive, margin_pct, CostInputs, DerivedPrices};
pub use format::{format_money, format_percent, parse_decimal};
