// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   alpha = 2 / (period + 1)
//   EMA_0 = close_0
//   EMA_t = alpha * close_t + (1 - alpha) * EMA_{t-1}
//
// Seeded with the first observation, so the series is defined from index 0.
// A missing observation carries the previous value forward; the decay it
// skipped is applied when the next observation arrives.
// =============================================================================

use super::error::{ensure_period, IndicatorError};
use super::window::{finite, observations};
use crate::types::IndicatorSeries;

/// EMA of a raw close column.
pub fn ema(closes: &[f64], period: usize) -> Result<IndicatorSeries, IndicatorError> {
    ensure_period("ema period", period)?;
    ema_of(&observations(closes), period)
}

/// EMA of a series that may already contain undefined positions (for example
/// a MACD line). Leading `None`s stay `None` until the first observation.
pub fn ema_of(values: &[Option<f64>], period: usize) -> Result<IndicatorSeries, IndicatorError> {
    ensure_period("ema period", period)?;

    let alpha = 2.0 / (period as f64 + 1.0);
    let decay = 1.0 - alpha;

    let mut state: Option<f64> = None;
    // Weight of the running average relative to a fresh observation. It is
    // reset after every observation and decays once per missing one.
    let mut old_weight = 1.0;

    Ok(values
        .iter()
        .map(|value| {
            let observed = value.and_then(finite);
            match (state, observed) {
                (None, Some(x)) => {
                    state = Some(x);
                    old_weight = 1.0;
                }
                (None, None) => {}
                (Some(prev), observed) => {
                    old_weight *= decay;
                    if let Some(x) = observed {
                        if prev != x {
                            let next = (old_weight * prev + alpha * x) / (old_weight + alpha);
                            state = finite(next).or(Some(prev));
                        }
                        old_weight = 1.0;
                    }
                }
            }
            state
        })
        .collect())
}
