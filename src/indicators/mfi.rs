// =============================================================================
// Money Flow Index (MFI)
// =============================================================================
//
//   typical_t = (high + low + close) / 3
//   flow_t    = typical_t * volume_t
//   positive  = flow_t when typical rose against the previous bar, else 0
//   negative  = flow_t when typical fell against the previous bar, else 0
//   MFI       = 100 - 100 / (1 + Σpositive / Σnegative)
//
// Sums run over the trailing `period` bars; the first bar contributes zero to
// both. Zero negative flow follows the RSI policy (100, or undefined when the
// positive flow is zero too).
// =============================================================================

use super::error::{ensure_period, IndicatorError};
use super::rsi::strength_index;
use super::window::rolling_sum;
use crate::types::{IndicatorSeries, PriceBar};

pub fn mfi(bars: &[PriceBar], period: usize) -> Result<IndicatorSeries, IndicatorError> {
    ensure_period("mfi period", period)?;

    let typical: Vec<f64> = bars.iter().map(PriceBar::typical_price).collect();
    let mut positive = Vec::with_capacity(bars.len());
    let mut negative = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let flow = typical[i] * bar.volume;
        let prev = i.checked_sub(1).map(|p| typical[p]);
        let rose = prev.is_some_and(|p| typical[i] > p);
        let fell = prev.is_some_and(|p| typical[i] < p);
        positive.push(Some(if rose { flow } else { 0.0 }));
        negative.push(Some(if fell { flow } else { 0.0 }));
    }

    let positive_sum = rolling_sum(&positive, period)?;
    let negative_sum = rolling_sum(&negative, period)?;

    Ok(positive_sum
        .iter()
        .zip(&negative_sum)
        .map(|pair| match pair {
            (Some(p), Some(n)) => strength_index(*p, *n),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bar(high: f64, low: f64, close: f64, volume: f64) -> PriceBar {
        let ts = Utc.timestamp_opt(0, 0).unwrap();
        PriceBar::new(ts, close, high, low, close, volume)
    }

    #[test]
    fn mfi_known_value() {
        // typical 10, 12, 11 ; flows 100, 240, 110
        let bars = vec![
            bar(10.0, 10.0, 10.0, 10.0),
            bar(12.0, 12.0, 12.0, 20.0),
            bar(11.0, 11.0, 11.0, 10.0),
        ];
        let out = mfi(&bars, 2).unwrap();
        assert_eq!(out[0], None);
        assert_eq!(out[1], Some(100.0));
        // positive 240, negative 110
        let expected = 100.0 - 100.0 / (1.0 + 240.0 / 110.0);
        assert!((out[2].unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn mfi_only_falling_is_zero() {
        let bars: Vec<PriceBar> = (0..20)
            .map(|i| {
                let p = 100.0 - i as f64;
                bar(p + 1.0, p - 1.0, p, 1000.0)
            })
            .collect();
        let out = mfi(&bars, 14).unwrap();
        assert_eq!(out[13], Some(0.0));
        assert_eq!(out[19], Some(0.0));
    }

    #[test]
    fn mfi_flat_is_undefined() {
        let bars = vec![bar(11.0, 9.0, 10.0, 500.0); 20];
        assert!(mfi(&bars, 14).unwrap().iter().all(Option::is_none));
    }

    #[test]
    fn mfi_in_range() {
        let bars: Vec<PriceBar> = (0..60)
            .map(|i| {
                let p = 50.0 + (i as f64 * 0.7).sin() * 6.0;
                bar(p + 0.8, p - 0.8, p, 100.0 + (i % 5) as f64 * 40.0)
            })
            .collect();
        let out = mfi(&bars, 14).unwrap();
        assert!(out.iter().flatten().count() > 0);
        for &v in out.iter().flatten() {
            assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn mfi_period_zero() {
        assert!(mfi(&[], 0).is_err());
    }
}
