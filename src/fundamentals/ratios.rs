// =============================================================================
// Financial Ratios
// =============================================================================
//
// Scalar ratio functions. Each returns `None` when its denominator is zero or
// the result overflows to a non-finite value; otherwise negative inputs give
// negative ratios. Percentages are computed as `(a / b) * 100`.
// =============================================================================

fn quotient(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator).filter(|q| q.is_finite())
    }
}

fn percent(numerator: f64, denominator: f64) -> Option<f64> {
    quotient(numerator, denominator)
        .map(|q| q * 100.0)
        .filter(|p| p.is_finite())
}

/// Price-to-Earnings.
pub fn pe_ratio(price: f64, eps: f64) -> Option<f64> {
    quotient(price, eps)
}

/// Price-to-Book.
pub fn pb_ratio(price: f64, book_value_per_share: f64) -> Option<f64> {
    quotient(price, book_value_per_share)
}

/// P/E divided by the annual earnings growth rate (in percent).
pub fn peg_ratio(pe_ratio: f64, earnings_growth_rate: f64) -> Option<f64> {
    quotient(pe_ratio, earnings_growth_rate)
}

/// Return on Equity, percent.
pub fn roe(net_income: f64, shareholders_equity: f64) -> Option<f64> {
    percent(net_income, shareholders_equity)
}

/// Return on Assets, percent.
pub fn roa(net_income: f64, total_assets: f64) -> Option<f64> {
    percent(net_income, total_assets)
}

pub fn debt_to_equity(total_debt: f64, shareholders_equity: f64) -> Option<f64> {
    quotient(total_debt, shareholders_equity)
}

/// Current assets over current liabilities (liquidity).
pub fn current_ratio(current_assets: f64, current_liabilities: f64) -> Option<f64> {
    quotient(current_assets, current_liabilities)
}

/// Annual dividend per share over price, percent.
pub fn dividend_yield(annual_dividend: f64, price: f64) -> Option<f64> {
    percent(annual_dividend, price)
}

/// Period-over-period EPS change relative to the magnitude of the previous
/// EPS, percent. A move from -2 to -1 is +50%.
pub fn eps_growth(current_eps: f64, previous_eps: f64) -> Option<f64> {
    percent(current_eps - previous_eps, previous_eps.abs())
}
