// =============================================================================
// Weighted Moving Average (WMA)
// =============================================================================
//
// Linear weights 1..=period over the trailing window, the most recent close
// carrying weight `period`:
//
//   WMA_t = Σ w_k * close_k / Σ w_k
//
// The weighted sum slides in O(1): when the window moves one bar every
// retained close loses one unit of weight and the oldest drops out, so
//
//   W_t = W_{t-1} + period * close_t - S_{t-1}
//
// where S_{t-1} is the plain sum of the previous window. A non-finite close
// restarts the accumulation.
// =============================================================================

use super::error::{ensure_period, IndicatorError};
use super::window::finite;
use crate::types::IndicatorSeries;

/// Linearly weighted trailing average of `closes`.
pub fn wma(closes: &[f64], period: usize) -> Result<IndicatorSeries, IndicatorError> {
    ensure_period("wma period", period)?;

    let p = period as f64;
    let weight_sum = p * (p + 1.0) / 2.0;

    // Length of the current run of finite closes, capped at `period`.
    let mut run = 0usize;
    let mut plain = 0.0;
    let mut weighted = 0.0;

    Ok(closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            if !close.is_finite() {
                run = 0;
                plain = 0.0;
                weighted = 0.0;
                return None;
            }

            if run < period {
                run += 1;
                weighted += run as f64 * close;
                plain += close;
            } else {
                weighted += p * close - plain;
                plain += close - closes[i - period];
            }

            if run == period {
                finite(weighted / weight_sum)
            } else {
                None
            }
        })
        .collect())
}
