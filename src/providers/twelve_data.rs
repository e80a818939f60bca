// =============================================================================
// Twelve Data REST client
// =============================================================================
//
// The API key travels as the `apikey` query parameter. Twelve Data reports
// many failures with HTTP 200 and `{"status": "error", "message": ...}`, so
// the body status is checked as well as the HTTP one.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::throttle::RequestThrottle;
use super::{bar_from_row, listing_from_row, MarketDataProvider, REQUEST_TIMEOUT};
use crate::types::{sort_chronologically, PriceSeries, StockListing};

/// Largest page Twelve Data serves for one time-series request.
const OUTPUT_SIZE: &str = "5000";

pub struct TwelveDataClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    throttle: RequestThrottle,
}

impl TwelveDataClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build Twelve Data HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "TwelveDataClient initialised");

        Ok(Self {
            api_key: api_key.into(),
            base_url,
            client,
            throttle: RequestThrottle::default(),
        })
    }

    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.throttle = RequestThrottle::new(interval);
        self
    }

    async fn get_json(&self, path: &str, mut query: Vec<(&str, String)>) -> Result<Value> {
        self.throttle.acquire().await;
        query.push(("apikey", self.api_key.clone()));

        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .with_context(|| format!("GET {path} request failed"))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Twelve Data GET {path} returned {status}");
        }

        let body: Value = resp
            .json()
            .await
            .with_context(|| format!("failed to parse Twelve Data {path} response"))?;
        if let Some(message) = api_error(&body) {
            anyhow::bail!("Twelve Data GET {path} failed: {message}");
        }
        Ok(body)
    }
}

impl std::fmt::Debug for TwelveDataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwelveDataClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Map the service's interval names onto Twelve Data's; unknown names pass
/// through unchanged.
pub fn map_interval(interval: &str) -> &str {
    match interval {
        "1d" => "1day",
        "1h" => "1h",
        "15m" => "15min",
        "5m" => "5min",
        "1m" => "1min",
        other => other,
    }
}

/// Error message of an in-band `{"status": "error"}` body.
fn api_error(body: &Value) -> Option<String> {
    if body.get("status").and_then(Value::as_str) != Some("error") {
        return None;
    }
    Some(
        body.get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string(),
    )
}

/// `values[]` rows as bars, oldest first (Twelve Data lists newest first).
pub fn parse_time_series(payload: &Value) -> PriceSeries {
    let mut series: PriceSeries = payload
        .get("values")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| bar_from_row(row, &["datetime"]))
                .collect()
        })
        .unwrap_or_default();
    sort_chronologically(&mut series);
    series
}

pub fn parse_symbol_search(payload: &Value) -> Vec<StockListing> {
    payload
        .get("data")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|r| listing_from_row(r, &["instrument_name"]))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl MarketDataProvider for TwelveDataClient {
    fn name(&self) -> &str {
        "twelve_data"
    }

    #[instrument(skip(self), name = "twelve_data::get_stock_data")]
    async fn get_stock_data(
        &self,
        symbol: &str,
        interval: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> PriceSeries {
        let mut query = vec![
            ("symbol", symbol.to_string()),
            ("interval", map_interval(interval).to_string()),
            ("outputsize", OUTPUT_SIZE.to_string()),
            ("format", "JSON".to_string()),
        ];
        if let Some(start) = start_date {
            query.push(("start_date", start.to_string()));
        }
        if let Some(end) = end_date {
            query.push(("end_date", end.to_string()));
        }

        match self.get_json("/time_series", query).await {
            Ok(payload) => {
                let series = parse_time_series(&payload);
                debug!(bars = series.len(), "time series received");
                series
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch time series from Twelve Data");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self), name = "twelve_data::get_company_info")]
    async fn get_company_info(&self, symbol: &str) -> Option<Value> {
        let query = vec![("symbol", symbol.to_string())];
        match self.get_json("/profile", query).await {
            Ok(Value::Object(map)) if !map.is_empty() => Some(Value::Object(map)),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "failed to fetch profile from Twelve Data");
                None
            }
        }
    }

    #[instrument(skip(self), name = "twelve_data::search_stocks")]
    async fn search_stocks(&self, query: &str) -> Vec<StockListing> {
        let params = vec![("symbol", query.to_string())];
        match self.get_json("/symbol_search", params).await {
            Ok(payload) => parse_symbol_search(&payload),
            Err(e) => {
                warn!(error = %e, "failed to search Twelve Data symbols");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn interval_mapping() {
        assert_eq!(map_interval("1d"), "1day");
        assert_eq!(map_interval("15m"), "15min");
        assert_eq!(map_interval("1m"), "1min");
        assert_eq!(map_interval("1week"), "1week");
    }

    #[test]
    fn time_series_is_reversed_to_oldest_first() {
        let payload = json!({
            "meta": {"symbol": "BBCA"},
            "values": [
                {"datetime": "2024-01-03", "open": "9200", "high": "9350", "low": "9150", "close": "9300", "volume": "1000"},
                {"datetime": "2024-01-02", "open": "9100", "high": "9200", "low": "9050", "close": "9150", "volume": "800"}
            ],
            "status": "ok"
        });
        let series = parse_time_series(&payload);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].close, 9150.0);
        assert_eq!(series[1].high, 9350.0);
    }

    #[test]
    fn error_body_is_detected() {
        let body = json!({"code": 400, "message": "symbol not found", "status": "error"});
        assert_eq!(api_error(&body).as_deref(), Some("symbol not found"));
        assert!(api_error(&json!({"status": "ok"})).is_none());
        assert!(parse_time_series(&body).is_empty());
    }

    #[test]
    fn symbol_search_rows() {
        let payload = json!({"data": [
            {"symbol": "BBCA", "instrument_name": "Bank Central Asia Tbk PT", "exchange": "IDX"},
            {"instrument_name": "missing symbol"}
        ]});
        let hits = parse_symbol_search(&payload);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Bank Central Asia Tbk PT");
    }

    #[test]
    fn debug_redacts_key() {
        let client = TwelveDataClient::new("td-secret", "https://example.invalid").unwrap();
        assert!(!format!("{client:?}").contains("td-secret"));
    }

    #[tokio::test]
    async fn financials_are_not_offered() {
        let client = TwelveDataClient::new("k", "http://127.0.0.1:9").unwrap();
        assert!(client.get_financials("BBCA").await.is_none());
        assert!(client.get_all_stocks().await.is_empty());
    }

    #[tokio::test]
    async fn unreachable_upstream_is_no_data() {
        let client = TwelveDataClient::new("key", "http://127.0.0.1:9")
            .unwrap()
            .with_min_interval(Duration::ZERO);
        assert!(client.get_stock_data("BBCA", "1d", None, None).await.is_empty());
        assert!(client.get_company_info("BBCA").await.is_none());
        assert!(client.search_stocks("bank").await.is_empty());
        assert!(client.get_financials("BBCA").await.is_none());
    }
}
