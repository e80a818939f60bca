// =============================================================================
// Average True Range (ATR)
// =============================================================================
//
// True Range for each bar is the greatest of:
//   1. high - low
//   2. |high - previous close|
//   3. |low  - previous close|
//
// The first bar has no previous close, so its True Range is high - low.
// ATR is the simple trailing mean of True Range over `period` bars.
// =============================================================================

use super::error::{ensure_period, IndicatorError};
use super::window::rolling_mean;
use crate::types::{IndicatorSeries, PriceBar};

/// True Range per bar. Undefined candidates are skipped; a bar is `None` only
/// when none of them is finite.
pub fn true_range(bars: &[PriceBar]) -> IndicatorSeries {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let spread = bar.high - bar.low;
            let (gap_high, gap_low) = match i.checked_sub(1).map(|p| bars[p].close) {
                Some(prev) => ((bar.high - prev).abs(), (bar.low - prev).abs()),
                None => (f64::NAN, f64::NAN),
            };
            [spread, gap_high, gap_low]
                .into_iter()
                .filter(|x| x.is_finite())
                .fold(None, |acc: Option<f64>, x| Some(acc.map_or(x, |a| a.max(x))))
        })
        .collect()
}

/// ATR series aligned with `bars`, first defined at `period - 1`.
pub fn atr(bars: &[PriceBar], period: usize) -> Result<IndicatorSeries, IndicatorError> {
    ensure_period("atr period", period)?;
    rolling_mean(&true_range(bars), period)
}
