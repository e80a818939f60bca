// =============================================================================
// Relative Strength Index (RSI), simple-average variant
// =============================================================================
//
// Step 1: delta_t = close_t - close_{t-1}. The first bar has no delta and
//         contributes zero gain and zero loss.
// Step 2: avg_gain / avg_loss = trailing simple mean over `period` bars.
// Step 3: RS  = avg_gain / avg_loss
//         RSI = 100 - 100 / (1 + RS)
//
// Because bar 0 contributes a zero, the first defined RSI is at `period - 1`.
// =============================================================================

use super::error::{ensure_period, IndicatorError};
use super::window::{finite, rolling_mean};
use crate::types::IndicatorSeries;

/// RSI series aligned with `closes`. Values lie in [0, 100].
///
/// - No losses and some gains => 100.
/// - No movement at all in the window => `None`.
pub fn rsi(closes: &[f64], period: usize) -> Result<IndicatorSeries, IndicatorError> {
    ensure_period("rsi period", period)?;

    let (gains, losses) = gains_and_losses(closes);
    let avg_gain = rolling_mean(&gains, period)?;
    let avg_loss = rolling_mean(&losses, period)?;

    Ok(avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(g, l)| match (g, l) {
            (Some(g), Some(l)) => strength_index(*g, *l),
            _ => None,
        })
        .collect())
}

/// Split consecutive close changes into gain and loss columns. An undefined
/// delta (first bar, or a non-finite close) counts as neither.
fn gains_and_losses(closes: &[f64]) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        let delta = if i == 0 {
            f64::NAN
        } else {
            closes[i] - closes[i - 1]
        };
        gains.push(Some(if delta > 0.0 { delta } else { 0.0 }));
        losses.push(Some(if delta < 0.0 { -delta } else { 0.0 }));
    }
    (gains, losses)
}

/// `100 - 100 / (1 + up / down)` with the zero-denominator policy shared by
/// RSI and MFI.
pub(crate) fn strength_index(up: f64, down: f64) -> Option<f64> {
    if down == 0.0 {
        return if up != 0.0 { Some(100.0) } else { None };
    }
    let ratio = up / down;
    finite(100.0 - 100.0 / (1.0 + ratio))
}
