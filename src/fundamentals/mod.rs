// =============================================================================
// Fundamental Ratio Engine
// =============================================================================
//
// Scalar ratios over a company's financial-statement figures, plus the
// threshold signals reported alongside them.

pub mod ratios;
pub mod report;
pub mod snapshot;

pub use ratios::{
    current_ratio, debt_to_equity, dividend_yield, eps_growth, pb_ratio, pe_ratio, peg_ratio, roa,
    roe,
};
pub use report::{analyze_company, analyze_company_with, RatioReport, ZeroRatioPolicy};
pub use snapshot::FinancialSnapshot;
