// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD line = EMA(fast) - EMA(slow)
//   Signal    = EMA(signal) of the MACD line
//   Histogram = MACD line - Signal
// =============================================================================

use serde::Serialize;

use super::ema::{ema, ema_of};
use super::error::{ensure_period, IndicatorError};
use super::window::zip_with;
use crate::types::IndicatorSeries;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacdOutput {
    pub macd: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

pub fn macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<MacdOutput, IndicatorError> {
    ensure_period("macd fast period", fast)?;
    ensure_period("macd slow period", slow)?;
    ensure_period("macd signal period", signal)?;

    let fast_ema = ema(closes, fast)?;
    let slow_ema = ema(closes, slow)?;
    let line = zip_with(&fast_ema, &slow_ema, |f, s| f - s);
    let signal_line = ema_of(&line, signal)?;
    let histogram = zip_with(&line, &signal_line, |m, s| m - s);

    Ok(MacdOutput {
        macd: line,
        signal: signal_line,
        histogram,
    })
}
