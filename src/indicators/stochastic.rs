// =============================================================================
// Stochastic Oscillator
// =============================================================================
//
//   %K = 100 * (close - lowest_low) / (highest_high - lowest_low)
//   %D = SMA(%K, d_period)
//
// Extremes are taken over the trailing `k_period` bars. A window with zero
// range leaves %K undefined, and any undefined %K blocks the %D window.
// =============================================================================

use serde::Serialize;

use super::error::{ensure_period, IndicatorError};
use super::window::{finite, rolling_max, rolling_mean, rolling_min};
use crate::types::{IndicatorSeries, PriceBar};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stochastic {
    pub k: IndicatorSeries,
    pub d: IndicatorSeries,
}

pub fn stochastic(
    bars: &[PriceBar],
    k_period: usize,
    d_period: usize,
) -> Result<Stochastic, IndicatorError> {
    ensure_period("stochastic k period", k_period)?;
    ensure_period("stochastic d period", d_period)?;

    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let lowest = rolling_min(&lows, k_period)?;
    let highest = rolling_max(&highs, k_period)?;

    let k: IndicatorSeries = bars
        .iter()
        .zip(lowest.iter().zip(&highest))
        .map(|(bar, extremes)| match extremes {
            (Some(ll), Some(hh)) => {
                let range = hh - ll;
                if range == 0.0 {
                    None
                } else {
                    finite(100.0 * (bar.close - ll) / range)
                }
            }
            _ => None,
        })
        .collect();
    let d = rolling_mean(&k, d_period)?;

    Ok(Stochastic { k, d })
}
