// =============================================================================
// Indicator Frame: every indicator over one price series
// =============================================================================

use chrono::SecondsFormat;
use serde::Serialize;
use serde_json::{Map, Value};

use super::adx::adx;
use super::atr::atr;
use super::bollinger::bollinger_bands;
use super::ema::ema;
use super::error::IndicatorError;
use super::macd::macd;
use super::mfi::mfi;
use super::obv::obv;
use super::rsi::rsi;
use super::sma::sma;
use super::stochastic::stochastic;
use crate::types::{closes, IndicatorSeries, PriceBar};

/// Look-backs for the paired `sma_N` / `ema_N` columns.
pub const MOVING_AVERAGE_PERIODS: [usize; 5] = [7, 20, 50, 100, 200];

pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STD: f64 = 2.0;
pub const STOCH_K: usize = 14;
pub const STOCH_D: usize = 3;
pub const ATR_PERIOD: usize = 14;
pub const ADX_PERIOD: usize = 14;
pub const MFI_PERIOD: usize = 14;

/// The input bars plus one named column per indicator, all of equal length.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    bars: Vec<PriceBar>,
    columns: Vec<(&'static str, IndicatorSeries)>,
}

/// Headline values for the most recent bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalSummary {
    pub price: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Column names in output order.
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|(name, _)| *name)
    }

    pub fn column(&self, name: &str) -> Option<&IndicatorSeries> {
        self.columns
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, series)| series)
    }

    /// Value of `name` at the last bar, if the column exists and is defined there.
    pub fn latest(&self, name: &str) -> Option<f64> {
        self.column(name)?.last().copied().flatten()
    }

    pub fn summary(&self) -> TechnicalSummary {
        TechnicalSummary {
            price: self.bars.last().map(|b| b.close).filter(|c| c.is_finite()),
            rsi: self.latest("rsi"),
            macd: self.latest("macd"),
            macd_signal: self.latest("macd_signal"),
            sma_20: self.latest("sma_20"),
            sma_50: self.latest("sma_50"),
        }
    }

    /// One JSON object per bar: timestamp, OHLCV, then every column.
    /// Undefined values (and non-finite prices) serialize as `null`.
    pub fn records(&self) -> Vec<Value> {
        self.bars
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                let mut row = Map::new();
                row.insert(
                    "timestamp".into(),
                    Value::from(bar.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
                );
                row.insert("open".into(), Value::from(bar.open));
                row.insert("high".into(), Value::from(bar.high));
                row.insert("low".into(), Value::from(bar.low));
                row.insert("close".into(), Value::from(bar.close));
                row.insert("volume".into(), Value::from(bar.volume));
                for (name, series) in &self.columns {
                    row.insert((*name).into(), Value::from(series[i]));
                }
                Value::Object(row)
            })
            .collect()
    }
}

/// Run every indicator with its standard parameters over `bars`.
///
/// Bars are used in the order given; callers sort them beforehand.
pub fn calculate_all(bars: &[PriceBar]) -> Result<IndicatorFrame, IndicatorError> {
    let close = closes(bars);
    let mut columns: Vec<(&'static str, IndicatorSeries)> = Vec::with_capacity(25);

    const SMA_NAMES: [&str; 5] = ["sma_7", "sma_20", "sma_50", "sma_100", "sma_200"];
    const EMA_NAMES: [&str; 5] = ["ema_7", "ema_20", "ema_50", "ema_100", "ema_200"];
    for (i, &period) in MOVING_AVERAGE_PERIODS.iter().enumerate() {
        columns.push((SMA_NAMES[i], sma(&close, period)?));
        columns.push((EMA_NAMES[i], ema(&close, period)?));
    }
    columns.push(("ema_12", ema(&close, MACD_FAST)?));
    columns.push(("ema_26", ema(&close, MACD_SLOW)?));

    columns.push(("rsi", rsi(&close, RSI_PERIOD)?));

    let m = macd(&close, MACD_FAST, MACD_SLOW, MACD_SIGNAL)?;
    columns.push(("macd", m.macd));
    columns.push(("macd_signal", m.signal));
    columns.push(("macd_histogram", m.histogram));

    let bands = bollinger_bands(&close, BOLLINGER_PERIOD, BOLLINGER_STD)?;
    columns.push(("bb_upper", bands.upper));
    columns.push(("bb_middle", bands.middle));
    columns.push(("bb_lower", bands.lower));

    let stoch = stochastic(bars, STOCH_K, STOCH_D)?;
    columns.push(("stoch_k", stoch.k));
    columns.push(("stoch_d", stoch.d));

    columns.push(("atr", atr(bars, ATR_PERIOD)?));
    columns.push(("adx", adx(bars, ADX_PERIOD)?));
    columns.push(("obv", obv(bars)));
    columns.push(("mfi", mfi(bars, MFI_PERIOD)?));

    Ok(IndicatorFrame {
        bars: bars.to_vec(),
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn trending_bars(n: usize) -> Vec<PriceBar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                let mid = 1000.0 + i as f64 * 3.0 + (i as f64 * 0.5).sin() * 20.0;
                PriceBar::new(
                    start + Duration::days(i as i64),
                    mid - 2.0,
                    mid + 10.0,
                    mid - 10.0,
                    mid + 1.0,
                    10_000.0 + (i % 7) as f64 * 500.0,
                )
            })
            .collect()
    }

    #[test]
    fn column_order_is_stable() {
        let frame = calculate_all(&trending_bars(10)).unwrap();
        let names: Vec<&str> = frame.column_names().collect();
        assert_eq!(
            names,
            vec![
                "sma_7", "ema_7", "sma_20", "ema_20", "sma_50", "ema_50", "sma_100", "ema_100",
                "sma_200", "ema_200", "ema_12", "ema_26", "rsi", "macd", "macd_signal",
                "macd_histogram", "bb_upper", "bb_middle", "bb_lower", "stoch_k", "stoch_d",
                "atr", "adx", "obv", "mfi",
            ]
        );
    }

    #[test]
    fn every_column_matches_input_length() {
        let bars = trending_bars(75);
        let frame = calculate_all(&bars).unwrap();
        assert_eq!(frame.len(), 75);
        for name in frame.column_names() {
            assert_eq!(frame.column(name).unwrap().len(), 75, "{name}");
        }
    }

    #[test]
    fn long_windows_undefined_on_short_history() {
        let frame = calculate_all(&trending_bars(60)).unwrap();
        assert!(frame.column("sma_100").unwrap().iter().all(Option::is_none));
        assert!(frame.column("sma_200").unwrap().iter().all(Option::is_none));
        assert!(frame.latest("sma_50").is_some());
        assert!(frame.latest("ema_200").is_some());
    }

    #[test]
    fn empty_input_gives_empty_frame() {
        let frame = calculate_all(&[]).unwrap();
        assert!(frame.is_empty());
        assert!(frame.records().is_empty());
        assert_eq!(frame.summary().price, None);
    }

    #[test]
    fn summary_reads_last_bar() {
        let bars = trending_bars(80);
        let frame = calculate_all(&bars).unwrap();
        let summary = frame.summary();
        assert_eq!(summary.price, Some(bars[79].close));
        assert_eq!(summary.rsi, frame.column("rsi").unwrap()[79]);
        assert!(summary.sma_50.is_some());
    }

    #[test]
    fn records_use_null_for_undefined() {
        let frame = calculate_all(&trending_bars(30)).unwrap();
        let rows = frame.records();
        assert_eq!(rows.len(), 30);
        assert!(rows[0]["sma_20"].is_null());
        assert!(rows[29]["sma_20"].is_number());
        assert_eq!(rows[0]["obv"], 0.0);
        assert_eq!(rows[0]["timestamp"], "2024-01-02T00:00:00Z");
        let text = serde_json::to_string(&rows).unwrap();
        assert!(!text.contains("NaN"));
    }

    #[test]
    fn unknown_column_is_none() {
        let frame = calculate_all(&trending_bars(5)).unwrap();
        assert!(frame.column("vwap").is_none());
        assert_eq!(frame.latest("vwap"), None);
    }
}
