// =============================================================================
// Bollinger Bands
// =============================================================================
//
//   middle = SMA(period)
//   upper  = middle + num_std * σ
//   lower  = middle - num_std * σ
//
// σ is the sample standard deviation (n - 1 denominator) of the same window.
// =============================================================================

use serde::Serialize;

use super::error::{ensure_period, IndicatorError};
use super::sma::sma;
use super::window::{observations, rolling_sample_std, zip_with};
use crate::types::IndicatorSeries;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BollingerBands {
    pub upper: IndicatorSeries,
    pub middle: IndicatorSeries,
    pub lower: IndicatorSeries,
}

/// Bands around the trailing mean. `num_std` must be finite; negative values
/// are accepted and simply swap the bands.
pub fn bollinger_bands(
    closes: &[f64],
    period: usize,
    num_std: f64,
) -> Result<BollingerBands, IndicatorError> {
    ensure_period("bollinger period", period)?;
    if !num_std.is_finite() {
        return Err(IndicatorError::invalid_argument(format!(
            "bollinger std multiplier must be finite, got {num_std}"
        )));
    }

    let middle = sma(closes, period)?;
    let sigma = rolling_sample_std(&observations(closes), period)?;
    let upper = zip_with(&middle, &sigma, |m, s| m + s * num_std);
    let lower = zip_with(&middle, &sigma, |m, s| m - s * num_std);

    Ok(BollingerBands {
        upper,
        middle,
        lower,
    })
}
