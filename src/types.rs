// =============================================================================
// Shared types used across the analysis service
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One OHLCV bar. Immutable once constructed; the engines only ever borrow it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl PriceBar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// `(high + low + close) / 3`
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Chronologically ordered bars, oldest first. Position `i` is the `i`-th bar
/// in time; every indicator output is indexed the same way.
pub type PriceSeries = Vec<PriceBar>;

/// Indicator output aligned 1:1 with its input series. `None` marks a position
/// with insufficient history or an undefined value (zero denominator).
pub type IndicatorSeries = Vec<Option<f64>>;

/// Sort bars oldest-first. The sort is stable, so bars sharing a timestamp
/// keep the order the provider delivered them in.
pub fn sort_chronologically(series: &mut PriceSeries) {
    series.sort_by_key(|bar| bar.timestamp);
}

/// Extract the close column.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// A JSON number or numeric string as a finite `f64`. Upstream APIs emit
/// both; anything else, including non-finite values, is `None`.
pub fn numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|x| x.is_finite())
}

/// A symbol/name pair returned by search and listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockListing {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar_at(secs: i64, close: f64) -> PriceBar {
        let ts = Utc.timestamp_opt(secs, 0).unwrap();
        PriceBar::new(ts, close, close, close, close, 1.0)
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let mut series = vec![bar_at(20, 1.0), bar_at(10, 2.0), bar_at(10, 3.0)];
        sort_chronologically(&mut series);
        let got: Vec<f64> = closes(&series);
        assert_eq!(got, vec![2.0, 3.0, 1.0]);
    }

    #[test]
    fn typical_price_is_hlc_mean() {
        let ts = Utc.timestamp_opt(0, 0).unwrap();
        let bar = PriceBar::new(ts, 1.0, 12.0, 6.0, 9.0, 0.0);
        assert!((bar.typical_price() - 9.0).abs() < 1e-12);
    }

    #[test]
    fn numeric_accepts_numbers_and_strings() {
        assert_eq!(numeric(&serde_json::json!(4)), Some(4.0));
        assert_eq!(numeric(&serde_json::json!("2.5")), Some(2.5));
        assert_eq!(numeric(&serde_json::json!("inf")), None);
        assert_eq!(numeric(&serde_json::json!(null)), None);
    }

    #[test]
    fn bar_serialises_timestamp_as_rfc3339() {
        let bar = bar_at(0, 5.0);
        let json = serde_json::to_value(bar).unwrap();
        assert_eq!(json["timestamp"], "1970-01-01T00:00:00Z");
        assert_eq!(json["close"], 5.0);
    }
}
