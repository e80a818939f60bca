// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// ADX measures the *strength* of a trend regardless of its direction.
//
// Step 1: Directional Movement per bar (zero on the first bar):
//           up   = high_t - high_{t-1}
//           down = low_{t-1} - low_t
//           +DM  = up   if up > down and up > 0,   else 0
//           -DM  = down if down > up and down > 0, else 0
// Step 2: ±DI = 100 * SMA(±DM, period) / ATR(period)
// Step 3: DX  = 100 * |+DI - -DI| / (+DI + -DI)
// Step 4: ADX = SMA(DX, period)
//
// A zero ATR leaves DI undefined; a zero DI sum leaves DX undefined.
// The first ADX value therefore needs 2 * period - 1 bars.
// =============================================================================

use super::atr::atr;
use super::error::{ensure_period, IndicatorError};
use super::window::{finite, rolling_mean, zip_with};
use crate::types::{IndicatorSeries, PriceBar};

pub fn adx(bars: &[PriceBar], period: usize) -> Result<IndicatorSeries, IndicatorError> {
    ensure_period("adx period", period)?;

    let (plus_dm, minus_dm) = directional_movement(bars);
    let range = atr(bars, period)?;
    let plus_di = directional_index(&rolling_mean(&plus_dm, period)?, &range);
    let minus_di = directional_index(&rolling_mean(&minus_dm, period)?, &range);

    let dx: IndicatorSeries = plus_di
        .iter()
        .zip(&minus_di)
        .map(|pair| match pair {
            (Some(p), Some(m)) => {
                let total = p + m;
                if total == 0.0 {
                    None
                } else {
                    finite(100.0 * (p - m).abs() / total)
                }
            }
            _ => None,
        })
        .collect();

    rolling_mean(&dx, period)
}

fn directional_movement(bars: &[PriceBar]) -> (IndicatorSeries, IndicatorSeries) {
    let mut plus = Vec::with_capacity(bars.len());
    let mut minus = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let (up, down) = match i.checked_sub(1).map(|p| &bars[p]) {
            Some(prev) => (bar.high - prev.high, prev.low - bar.low),
            None => (0.0, 0.0),
        };
        plus.push(Some(if up > down && up > 0.0 { up } else { 0.0 }));
        minus.push(Some(if down > up && down > 0.0 { down } else { 0.0 }));
    }
    (plus, minus)
}

fn directional_index(smoothed_dm: &IndicatorSeries, range: &IndicatorSeries) -> IndicatorSeries {
    zip_with(smoothed_dm, range, |dm, atr| {
        if atr == 0.0 {
            f64::NAN
        } else {
            100.0 * (dm / atr)
        }
    })
}
