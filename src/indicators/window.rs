// =============================================================================
// Rolling Windows: fixed-size ring buffers with O(1) updates
// =============================================================================
//
// Every trailing-window indicator in this module is built on the primitives
// here, so the whole engine stays O(n) per indicator:
//
//   RollingWindow              compensated running sum + Welford mean/variance
//   rolling_min, rolling_max   monotonic deque of candidate indices
//
// Missing observations (`None`, or a non-finite input) occupy a slot in the
// window like any other bar, but a window that contains one produces `None`.
// =============================================================================

use std::collections::VecDeque;

use super::error::{ensure_period, IndicatorError};
use crate::types::IndicatorSeries;

/// `Some(x)` when `x` is finite, otherwise `None`.
#[inline]
pub fn finite(x: f64) -> Option<f64> {
    if x.is_finite() {
        Some(x)
    } else {
        None
    }
}

/// Lift a raw column into observations; non-finite entries become missing
/// once they enter a window.
pub fn observations(xs: &[f64]) -> Vec<Option<f64>> {
    xs.iter().copied().map(Some).collect()
}

/// Pointwise combination of two aligned series. The result is `None` wherever
/// either side is `None` or `f` produces a non-finite value.
pub fn zip_with(
    a: &[Option<f64>],
    b: &[Option<f64>],
    f: impl Fn(f64, f64) -> f64,
) -> IndicatorSeries {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => finite(f(*x, *y)),
            _ => None,
        })
        .collect()
}

// =============================================================================
// RollingWindow
// =============================================================================

/// Trailing window of the last `period` observations.
///
/// The sum is Kahan-compensated. Two exactness guarantees hold regardless of
/// accumulated rounding error: a window holding only zeros sums to exactly
/// `0.0`, and a window with no negative observations never reports a negative
/// sum.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    period: usize,
    slots: VecDeque<Option<f64>>,
    missing: usize,
    nonzero: usize,
    negative: usize,
    count: usize,
    sum: f64,
    compensation: f64,
    mean: f64,
    m2: f64,
}

impl RollingWindow {
    /// Window over `period` observations of a series of `len` values. The
    /// buffer never holds more than `len` entries, whatever the period.
    pub fn new(period: usize, len: usize) -> Self {
        Self {
            period,
            slots: VecDeque::with_capacity(period.min(len) + 1),
            missing: 0,
            nonzero: 0,
            negative: 0,
            count: 0,
            sum: 0.0,
            compensation: 0.0,
            mean: 0.0,
            m2: 0.0,
        }
    }

    /// Append the newest observation, evicting the oldest once the window is
    /// full. Non-finite values are recorded as missing.
    pub fn push(&mut self, value: Option<f64>) {
        let value = value.and_then(finite);
        self.slots.push_back(value);
        match value {
            Some(x) => self.add(x),
            None => self.missing += 1,
        }

        if self.slots.len() > self.period {
            match self.slots.pop_front().flatten() {
                Some(x) => self.remove(x),
                None => self.missing -= 1,
            }
        }
    }

    /// `true` once `period` observations are held and none is missing.
    pub fn is_ready(&self) -> bool {
        self.slots.len() == self.period && self.missing == 0
    }

    /// Sum of the window, or `None` while not ready.
    pub fn sum(&self) -> Option<f64> {
        if !self.is_ready() {
            return None;
        }
        Some(self.current_sum())
    }

    /// Arithmetic mean of the window, or `None` while not ready.
    pub fn mean(&self) -> Option<f64> {
        self.sum().map(|s| s / self.period as f64)
    }

    /// Sample standard deviation (ddof = 1). `None` while not ready and for a
    /// single-observation window.
    pub fn sample_std(&self) -> Option<f64> {
        if !self.is_ready() || self.count < 2 {
            return None;
        }
        let variance = self.m2.max(0.0) / (self.count - 1) as f64;
        finite(variance.sqrt())
    }

    fn current_sum(&self) -> f64 {
        if self.nonzero == 0 {
            0.0
        } else if self.negative == 0 && self.sum < 0.0 {
            0.0
        } else {
            self.sum
        }
    }

    fn add(&mut self, x: f64) {
        self.count += 1;
        if x != 0.0 {
            self.nonzero += 1;
        }
        if x < 0.0 {
            self.negative += 1;
        }
        self.kahan_add(x);

        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    fn remove(&mut self, x: f64) {
        self.count -= 1;
        if x != 0.0 {
            self.nonzero -= 1;
        }
        if x < 0.0 {
            self.negative -= 1;
        }

        if self.count == 0 {
            self.sum = 0.0;
            self.compensation = 0.0;
            self.mean = 0.0;
            self.m2 = 0.0;
            return;
        }

        self.kahan_add(-x);
        let delta = x - self.mean;
        self.mean -= delta / self.count as f64;
        self.m2 -= delta * (x - self.mean);
    }

    fn kahan_add(&mut self, x: f64) {
        let y = x - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }
}

// =============================================================================
// Series-level helpers
// =============================================================================

fn rolling_by(
    values: &[Option<f64>],
    period: usize,
    read: impl Fn(&RollingWindow) -> Option<f64>,
) -> Result<IndicatorSeries, IndicatorError> {
    ensure_period("period", period)?;
    let mut window = RollingWindow::new(period, values.len());
    Ok(values
        .iter()
        .map(|v| {
            window.push(*v);
            read(&window)
        })
        .collect())
}

/// Trailing simple mean over an already-derived series. Public so that any
/// indicator output can be smoothed again (e.g. %D over %K).
pub fn rolling_mean(
    values: &[Option<f64>],
    period: usize,
) -> Result<IndicatorSeries, IndicatorError> {
    rolling_by(values, period, RollingWindow::mean)
}

/// Trailing sum.
pub fn rolling_sum(
    values: &[Option<f64>],
    period: usize,
) -> Result<IndicatorSeries, IndicatorError> {
    rolling_by(values, period, RollingWindow::sum)
}

/// Trailing sample standard deviation (ddof = 1).
pub fn rolling_sample_std(
    values: &[Option<f64>],
    period: usize,
) -> Result<IndicatorSeries, IndicatorError> {
    rolling_by(values, period, RollingWindow::sample_std)
}

/// Trailing minimum.
pub fn rolling_min(values: &[f64], period: usize) -> Result<IndicatorSeries, IndicatorError> {
    rolling_extreme(values, period, |candidate, incumbent| candidate <= incumbent)
}

/// Trailing maximum.
pub fn rolling_max(values: &[f64], period: usize) -> Result<IndicatorSeries, IndicatorError> {
    rolling_extreme(values, period, |candidate, incumbent| candidate >= incumbent)
}

/// Monotonic-deque window extreme. `dominates(new, old)` says whether a newer
/// value makes an older candidate irrelevant.
fn rolling_extreme(
    values: &[f64],
    period: usize,
    dominates: impl Fn(f64, f64) -> bool,
) -> Result<IndicatorSeries, IndicatorError> {
    ensure_period("period", period)?;

    let mut candidates: VecDeque<usize> = VecDeque::with_capacity(period.min(values.len()));
    let mut last_missing: Option<usize> = None;
    let mut out = Vec::with_capacity(values.len());

    for (i, &x) in values.iter().enumerate() {
        if x.is_finite() {
            while let Some(&back) = candidates.back() {
                if dominates(x, values[back]) {
                    candidates.pop_back();
                } else {
                    break;
                }
            }
            candidates.push_back(i);
        } else {
            last_missing = Some(i);
        }

        // Evict candidates that slid out of the window.
        while let Some(&front) = candidates.front() {
            if i - front >= period {
                candidates.pop_front();
            } else {
                break;
            }
        }

        let window_start = (i + 1).checked_sub(period);
        let value = match window_start {
            None => None,
            Some(start) if last_missing.is_some_and(|m| m >= start) => None,
            Some(_) => candidates.front().map(|&idx| values[idx]),
        };
        out.push(value);
    }

    Ok(out)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn some(xs: &[f64]) -> Vec<Option<f64>> {
        xs.iter().copied().map(Some).collect()
    }

    #[test]
    fn mean_matches_direct_computation() {
        let out = rolling_mean(&some(&[10.0, 12.0, 14.0, 16.0, 18.0]), 3).unwrap();
        assert_eq!(out, vec![None, None, Some(12.0), Some(14.0), Some(16.0)]);
    }

    #[test]
    fn missing_value_blocks_every_window_it_touches() {
        let values = vec![Some(1.0), None, Some(3.0), Some(4.0), Some(5.0)];
        let out = rolling_sum(&values, 2).unwrap();
        assert_eq!(out, vec![None, None, None, Some(7.0), Some(9.0)]);
    }

    #[test]
    fn nan_counts_as_missing() {
        let out = rolling_mean(&some(&[1.0, f64::NAN, 3.0, 5.0]), 2).unwrap();
        assert_eq!(out, vec![None, None, None, Some(4.0)]);
    }

    #[test]
    fn zero_window_sums_to_exact_zero() {
        let mut values = some(&[0.1, 0.7, 0.3]);
        values.extend(some(&[0.0; 5]));
        let out = rolling_sum(&values, 3).unwrap();
        assert_eq!(out[7], Some(0.0));
    }

    #[test]
    fn non_negative_window_never_goes_negative() {
        let values = some(&[1e16, 1.0, 0.0, 0.0]);
        let out = rolling_sum(&values, 2).unwrap();
        for v in out.into_iter().flatten() {
            assert!(v >= 0.0, "negative sum {v}");
        }
    }

    #[test]
    fn sample_std_uses_ddof_one() {
        // [2, 4, 4, 4, 5, 5, 7, 9] has sample variance 32/7.
        let values = some(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let out = rolling_sample_std(&values, 8).unwrap();
        let expected = (32.0_f64 / 7.0).sqrt();
        assert!((out[7].unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn sample_std_after_eviction() {
        let values = some(&[100.0, 1.0, 2.0, 3.0]);
        let out = rolling_sample_std(&values, 3).unwrap();
        assert!((out[3].unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn sample_std_undefined_for_single_observation() {
        let out = rolling_sample_std(&some(&[1.0, 2.0]), 1).unwrap();
        assert_eq!(out, vec![None, None]);
    }

    #[test]
    fn flat_window_has_zero_std() {
        let out = rolling_sample_std(&some(&[5.0; 6]), 4).unwrap();
        assert_eq!(out[5], Some(0.0));
    }

    #[test]
    fn min_and_max_track_the_window() {
        let values = [5.0, 3.0, 4.0, 1.0, 2.0, 6.0];
        let mins = rolling_min(&values, 3).unwrap();
        let maxs = rolling_max(&values, 3).unwrap();
        assert_eq!(mins, vec![None, None, Some(3.0), Some(1.0), Some(1.0), Some(1.0)]);
        assert_eq!(maxs, vec![None, None, Some(5.0), Some(4.0), Some(4.0), Some(6.0)]);
    }

    #[test]
    fn extreme_with_missing_value() {
        let values = [5.0, f64::NAN, 4.0, 1.0];
        let mins = rolling_min(&values, 2).unwrap();
        assert_eq!(mins, vec![None, None, None, Some(1.0)]);
    }

    #[test]
    fn zero_period_is_invalid() {
        assert!(rolling_mean(&some(&[1.0]), 0).is_err());
        assert!(rolling_max(&[1.0], 0).is_err());
    }

    #[test]
    fn huge_period_allocates_nothing_and_yields_none() {
        let values = [1.0, 2.0, 3.0];
        for period in [1usize << 40, usize::MAX] {
            assert_eq!(rolling_mean(&some(&values), period).unwrap(), vec![None; 3]);
            assert_eq!(rolling_sample_std(&some(&values), period).unwrap(), vec![None; 3]);
            assert_eq!(rolling_min(&values, period).unwrap(), vec![None; 3]);
            assert_eq!(rolling_max(&values, period).unwrap(), vec![None; 3]);
        }
    }

    #[test]
    fn zip_with_propagates_none() {
        let a = vec![Some(3.0), None, Some(1.0)];
        let b = vec![Some(1.0), Some(1.0), None];
        assert_eq!(zip_with(&a, &b, |x, y| x - y), vec![Some(2.0), None, None]);
    }

    #[test]
    fn zip_with_drops_non_finite_results() {
        let a = vec![Some(1.0)];
        let b = vec![Some(0.0)];
        assert_eq!(zip_with(&a, &b, |x, y| x / y), vec![None]);
    }
}
