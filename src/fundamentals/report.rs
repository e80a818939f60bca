// =============================================================================
// Company Analysis: ratio report and qualitative signals
// =============================================================================
//
// `analyze_company` computes every ratio the snapshot supports, rounds it to
// two decimals for display and derives threshold signals from the unrounded
// values. Threshold pairs are exclusive: at most one of each pair fires.
//
//   P/E        < 15  undervalued        | > 30  overvalued
//   ROE        >= 15 good ROE
//   D/E        < 0.5 low leverage       | > 2   high leverage
//   Current    > 1.5 good liquidity     | < 1   low liquidity
// =============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ratios;
use super::snapshot::FinancialSnapshot;

pub const SIGNAL_LOW_PE: &str = "Low P/E ratio (potentially undervalued)";
pub const SIGNAL_HIGH_PE: &str = "High P/E ratio (potentially overvalued)";
pub const SIGNAL_GOOD_ROE: &str = "Good ROE (>15%)";
pub const SIGNAL_LOW_DE: &str = "Low debt-to-equity (financially stable)";
pub const SIGNAL_HIGH_DE: &str = "High debt-to-equity (high leverage)";
pub const SIGNAL_GOOD_LIQUIDITY: &str = "Good liquidity (CR > 1.5)";
pub const SIGNAL_LOW_LIQUIDITY: &str = "Low liquidity (CR < 1)";

/// How a ratio that evaluates to exactly zero is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroRatioPolicy {
    /// Zero counts as "no value": omitted from the report and never signals.
    /// Matches the output of the legacy service.
    #[default]
    DropZero,
    /// Any defined ratio is reported and takes part in the thresholds.
    KeepZero,
}

impl ZeroRatioPolicy {
    fn admits(self, value: Option<f64>) -> Option<f64> {
        match self {
            ZeroRatioPolicy::DropZero => value.filter(|v| *v != 0.0),
            ZeroRatioPolicy::KeepZero => value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatioReport {
    pub ratios: BTreeMap<String, f64>,
    pub signals: Vec<String>,
}

/// Analysis with the legacy zero handling.
pub fn analyze_company(snapshot: &FinancialSnapshot) -> RatioReport {
    analyze_company_with(snapshot, ZeroRatioPolicy::DropZero)
}

pub fn analyze_company_with(snapshot: &FinancialSnapshot, policy: ZeroRatioPolicy) -> RatioReport {
    let get = |v: Option<f64>| v.unwrap_or(0.0);
    let price = get(snapshot.price);
    let equity = get(snapshot.shareholders_equity);
    let net_income = get(snapshot.net_income);
    let growth = get(snapshot.earnings_growth_rate);

    let pe = policy.admits(ratios::pe_ratio(price, get(snapshot.eps)));
    let pb = policy.admits(ratios::pb_ratio(price, get(snapshot.book_value_per_share)));
    let peg = if growth != 0.0 {
        pe.and_then(|pe| policy.admits(ratios::peg_ratio(pe, growth)))
    } else {
        None
    };
    let roe = policy.admits(ratios::roe(net_income, equity));
    let roa = policy.admits(ratios::roa(net_income, get(snapshot.total_assets)));
    let de = policy.admits(ratios::debt_to_equity(get(snapshot.total_debt), equity));
    let cr = policy.admits(ratios::current_ratio(
        get(snapshot.current_assets),
        get(snapshot.current_liabilities),
    ));
    let dy = policy.admits(ratios::dividend_yield(get(snapshot.annual_dividend), price));

    let mut report = RatioReport::default();
    let computed = [
        ("pe_ratio", pe),
        ("pb_ratio", pb),
        ("peg_ratio", peg),
        ("roe", roe),
        ("roa", roa),
        ("debt_to_equity", de),
        ("current_ratio", cr),
        ("dividend_yield", dy),
    ];
    for (name, value) in computed {
        if let Some(rounded) = value.map(round2) {
            if policy == ZeroRatioPolicy::KeepZero || rounded != 0.0 {
                report.ratios.insert(name.to_string(), rounded);
            }
        }
    }

    let mut signal = |text: &str| report.signals.push(text.to_string());

    if let Some(pe) = pe {
        if pe < 15.0 {
            signal(SIGNAL_LOW_PE);
        } else if pe > 30.0 {
            signal(SIGNAL_HIGH_PE);
        }
    }
    // Inclusive, unlike the legacy `> 15`: an ROE of exactly 15% is "good".
    if roe.is_some_and(|v| v >= 15.0) {
        signal(SIGNAL_GOOD_ROE);
    }
    if let Some(de) = de {
        if de < 0.5 {
            signal(SIGNAL_LOW_DE);
        } else if de > 2.0 {
            signal(SIGNAL_HIGH_DE);
        }
    }
    if let Some(cr) = cr {
        if cr > 1.5 {
            signal(SIGNAL_GOOD_LIQUIDITY);
        } else if cr < 1.0 {
            signal(SIGNAL_LOW_LIQUIDITY);
        }
    }

    report
}

/// Two decimal places, rounding the exact binary value (halves to even).
///
/// Scaling by 100 first would round an already-rounded product, so 853.775
/// (stored just below the half) would come out as 853.78.
pub fn round2(x: f64) -> f64 {
    format!("{x:.2}").parse().unwrap_or(x)
}
