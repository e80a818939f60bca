// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
//   SMA_t = (close_{t-period+1} + ... + close_t) / period
//
// Undefined until `period` closes exist.
// =============================================================================

use super::error::{ensure_period, IndicatorError};
use super::window::{observations, rolling_mean};
use crate::types::IndicatorSeries;

/// Trailing arithmetic mean of `closes`, aligned with the input.
pub fn sma(closes: &[f64], period: usize) -> Result<IndicatorSeries, IndicatorError> {
    ensure_period("sma period", period)?;
    rolling_mean(&observations(closes), period)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_known_values() {
        let out = sma(&[10.0, 12.0, 14.0, 16.0, 18.0], 3).unwrap();
        assert_eq!(out, vec![None, None, Some(12.0), Some(14.0), Some(16.0)]);
    }

    #[test]
    fn sma_short_history_is_all_none() {
        let out = sma(&[1.0, 2.0, 3.0], 5).unwrap();
        assert_eq!(out, vec![None; 3]);
    }

    #[test]
    fn sma_period_one_is_identity() {
        let closes = [3.5, 1.25, 8.0];
        let out = sma(&closes, 1).unwrap();
        assert_eq!(out, vec![Some(3.5), Some(1.25), Some(8.0)]);
    }

    #[test]
    fn sma_empty_input() {
        assert!(sma(&[], 3).unwrap().is_empty());
    }

    #[test]
    fn sma_period_zero() {
        assert!(sma(&[1.0, 2.0], 0).is_err());
    }

    #[test]
    fn sma_double_smoothing_is_deterministic() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.37).sin() * 7.0).collect();
        let once = sma(&closes, 10).unwrap();
        let twice_a = rolling_mean(&once, 10).unwrap();
        let twice_b = rolling_mean(&sma(&closes, 10).unwrap(), 10).unwrap();
        let bits = |s: &IndicatorSeries| s.iter().map(|v| v.map(f64::to_bits)).collect::<Vec<_>>();
        assert_eq!(bits(&twice_a), bits(&twice_b));
        // Double smoothing needs 2 * period - 1 bars of history.
        assert!(twice_a[17].is_none());
        assert!(twice_a[18].is_some());
    }
}
