// =============================================================================
// Financial Snapshot
// =============================================================================
//
// Named financial-statement figures for one company. Every field is optional;
// an absent figure reads as 0 in the ratio engine, which leaves any ratio
// that divides by it undefined.
// =============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::numeric;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialSnapshot {
    pub price: Option<f64>,
    pub eps: Option<f64>,
    pub book_value_per_share: Option<f64>,
    pub net_income: Option<f64>,
    pub total_assets: Option<f64>,
    pub shareholders_equity: Option<f64>,
    pub total_debt: Option<f64>,
    pub current_assets: Option<f64>,
    pub current_liabilities: Option<f64>,
    pub annual_dividend: Option<f64>,
    pub earnings_growth_rate: Option<f64>,
}

impl FinancialSnapshot {
    /// Pick the known fields out of an arbitrary provider payload.
    ///
    /// Fields may be JSON numbers or numeric strings; anything else is ignored.
    pub fn from_value(payload: &Value) -> Self {
        let field = |name: &str| payload.get(name).and_then(numeric);
        Self {
            price: field("price"),
            eps: field("eps"),
            book_value_per_share: field("book_value_per_share"),
            net_income: field("net_income"),
            total_assets: field("total_assets"),
            shareholders_equity: field("shareholders_equity"),
            total_debt: field("total_debt"),
            current_assets: field("current_assets"),
            current_liabilities: field("current_liabilities"),
            annual_dividend: field("annual_dividend"),
            earnings_growth_rate: field("earnings_growth_rate"),
        }
    }
}
