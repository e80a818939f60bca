// =============================================================================
// On-Balance Volume (OBV)
// =============================================================================
//
//   OBV_0 = 0
//   OBV_t = OBV_{t-1} + sign(close_t - close_{t-1}) * volume_t
//
// An undefined step (non-finite close or volume) adds nothing.
// =============================================================================

use crate::types::{IndicatorSeries, PriceBar};

/// Cumulative signed volume. Defined at every position.
pub fn obv(bars: &[PriceBar]) -> IndicatorSeries {
    let mut running = 0.0;
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if let Some(prev) = i.checked_sub(1).map(|p| bars[p].close) {
                let step = direction(bar.close - prev) * bar.volume;
                if step.is_finite() {
                    running += step;
                }
            }
            Some(running)
        })
        .collect()
}

/// -1, 0 or 1; NaN stays NaN. `f64::signum` maps 0.0 to 1.0, hence this.
fn direction(delta: f64) -> f64 {
    if delta > 0.0 {
        1.0
    } else if delta < 0.0 {
        -1.0
    } else if delta == 0.0 {
        0.0
    } else {
        f64::NAN
    }
}
