// =============================================================================
// Market Data Providers
// =============================================================================
//
// Every upstream source implements `MarketDataProvider`. Provider faults
// (network, HTTP status, malformed payload) are logged and surface as "no
// data": an empty series, an empty listing, or `None`. Returned price series
// are sorted oldest-first.
// =============================================================================

pub mod cached;
pub mod sectors;
pub mod throttle;
pub mod twelve_data;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::types::{numeric, PriceBar, PriceSeries, StockListing};

pub use cached::CachedProvider;
pub use sectors::SectorsClient;
pub use twelve_data::TwelveDataClient;

/// Upstream request timeout.
pub const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Short identifier, also used as the cache-key prefix.
    fn name(&self) -> &str;

    async fn get_stock_data(
        &self,
        symbol: &str,
        interval: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> PriceSeries;

    async fn get_company_info(&self, symbol: &str) -> Option<Value>;

    async fn search_stocks(&self, query: &str) -> Vec<StockListing>;

    async fn get_all_stocks(&self) -> Vec<StockListing> {
        Vec::new()
    }

    async fn get_financials(&self, _symbol: &str) -> Option<Value> {
        None
    }
}

// =============================================================================
// Payload helpers shared by the clients
// =============================================================================

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and bare
/// dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// One OHLCV row. The first present key of `time_keys` supplies the
/// timestamp. Close is required; missing open/high/low fall back to close and
/// missing volume to 0.
pub fn bar_from_row(row: &Value, time_keys: &[&str]) -> Option<PriceBar> {
    let timestamp = time_keys
        .iter()
        .find_map(|k| row.get(*k).and_then(Value::as_str))
        .and_then(parse_timestamp)?;
    let close = row.get("close").and_then(numeric)?;
    let field = |k: &str| row.get(k).and_then(numeric);

    Some(PriceBar::new(
        timestamp,
        field("open").unwrap_or(close),
        field("high").unwrap_or(close),
        field("low").unwrap_or(close),
        close,
        field("volume").unwrap_or(0.0),
    ))
}

/// Symbol/name pair from a listing row; rows without a symbol are skipped.
pub fn listing_from_row(row: &Value, name_keys: &[&str]) -> Option<StockListing> {
    let symbol = row.get("symbol").and_then(Value::as_str)?.trim();
    if symbol.is_empty() {
        return None;
    }
    let name = name_keys
        .iter()
        .find_map(|k| row.get(*k).and_then(Value::as_str))
        .unwrap_or_default();
    Some(StockListing {
        symbol: symbol.to_string(),
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_timestamp_formats() {
        let day = parse_timestamp("2024-03-01").unwrap();
        assert_eq!(day.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        let intraday = parse_timestamp("2024-03-01 09:15:00").unwrap();
        assert_eq!(intraday.to_rfc3339(), "2024-03-01T09:15:00+00:00");
        let tz = parse_timestamp("2024-03-01T09:15:00+07:00").unwrap();
        assert_eq!(tz.to_rfc3339(), "2024-03-01T02:15:00+00:00");
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn bar_from_row_falls_back_to_close() {
        let bar = bar_from_row(&json!({"date": "2024-01-02", "close": 9150}), &["date"]).unwrap();
        assert_eq!((bar.open, bar.high, bar.low, bar.close, bar.volume), (9150.0, 9150.0, 9150.0, 9150.0, 0.0));
    }

    #[test]
    fn bar_from_row_reads_string_numbers() {
        let row = json!({
            "datetime": "2024-01-02", "open": "10.5", "high": "11", "low": "10", "close": "10.75", "volume": "1200"
        });
        let bar = bar_from_row(&row, &["date", "datetime"]).unwrap();
        assert_eq!(bar.high, 11.0);
        assert_eq!(bar.volume, 1200.0);
    }

    #[test]
    fn bar_from_row_requires_close_and_time() {
        assert!(bar_from_row(&json!({"date": "2024-01-02"}), &["date"]).is_none());
        assert!(bar_from_row(&json!({"close": 1.0}), &["date"]).is_none());
    }

    #[test]
    fn listing_from_row_uses_first_name_key() {
        let row = json!({"symbol": "BBCA.JK", "company_name": "Bank Central Asia"});
        let listing = listing_from_row(&row, &["name", "company_name"]).unwrap();
        assert_eq!(listing.symbol, "BBCA.JK");
        assert_eq!(listing.name, "Bank Central Asia");
        assert!(listing_from_row(&json!({"name": "x"}), &["name"]).is_none());
    }
}
