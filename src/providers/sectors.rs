// =============================================================================
// Sectors.app REST client (Indonesia Stock Exchange data)
// =============================================================================
//
// Authenticated with the raw API key in the `Authorization` header. Daily
// bars only; the interval argument is accepted but has no effect upstream.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::throttle::RequestThrottle;
use super::{bar_from_row, listing_from_row, MarketDataProvider, REQUEST_TIMEOUT};
use crate::types::{sort_chronologically, PriceSeries, StockListing};

const NAME_KEYS: [&str; 2] = ["name", "company_name"];

pub struct SectorsClient {
    base_url: String,
    client: reqwest::Client,
    throttle: RequestThrottle,
    max_historical_days: i64,
}

impl SectorsClient {
    pub fn new(api_key: &str, base_url: impl Into<String>, max_historical_days: i64) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(api_key).context("Sectors API key is not a valid header value")?;
        auth.set_sensitive(true);
        default_headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build Sectors HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "SectorsClient initialised");

        Ok(Self {
            base_url,
            client,
            throttle: RequestThrottle::default(),
            max_historical_days,
        })
    }

    /// Replace the request spacing (tests point the client at a local server).
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.throttle = RequestThrottle::new(interval);
        self
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        self.throttle.acquire().await;

        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {path} request failed"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Sectors GET {path} returned {status}: {body}");
        }

        resp.json()
            .await
            .with_context(|| format!("failed to parse Sectors {path} response"))
    }

    /// `start..end` for a daily request; a missing end is today and a missing
    /// start is `max_historical_days` before the end.
    pub fn date_window(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> (NaiveDate, NaiveDate) {
        let end = end_date.unwrap_or_else(|| Utc::now().date_naive());
        let start = start_date.unwrap_or(end - chrono::Duration::days(self.max_historical_days));
        (start, end)
    }

    async fn companies(&self) -> Result<Vec<StockListing>> {
        let payload = self.get_json("/companies", &[]).await?;
        Ok(parse_companies(&payload))
    }
}

impl std::fmt::Debug for SectorsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectorsClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Daily rows (`date`, `close`, optional `open/high/low/volume`) as bars,
/// oldest first.
pub fn parse_daily(payload: &Value) -> PriceSeries {
    let mut series: PriceSeries = payload
        .as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|row| bar_from_row(row, &["date", "timestamp"]))
                .collect()
        })
        .unwrap_or_default();
    sort_chronologically(&mut series);
    series
}

pub fn parse_companies(payload: &Value) -> Vec<StockListing> {
    payload
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| listing_from_row(r, &NAME_KEYS)).collect())
        .unwrap_or_default()
}

/// Case-insensitive substring match on symbol or name.
pub fn filter_listings(listings: Vec<StockListing>, query: &str) -> Vec<StockListing> {
    let needle = query.to_lowercase();
    listings
        .into_iter()
        .filter(|l| l.symbol.to_lowercase().contains(&needle) || l.name.to_lowercase().contains(&needle))
        .collect()
}

/// An empty object or array counts as "no data".
fn non_empty(payload: Value) -> Option<Value> {
    match &payload {
        Value::Null => None,
        Value::Object(map) if map.is_empty() => None,
        Value::Array(rows) if rows.is_empty() => None,
        _ => Some(payload),
    }
}

#[async_trait]
impl MarketDataProvider for SectorsClient {
    fn name(&self) -> &str {
        "sectors"
    }

    #[instrument(skip(self), name = "sectors::get_stock_data")]
    async fn get_stock_data(
        &self,
        symbol: &str,
        interval: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> PriceSeries {
        let (start, end) = self.date_window(start_date, end_date);
        let query = [("start", start.to_string()), ("end", end.to_string())];

        match self.get_json(&format!("/daily/{symbol}"), &query).await {
            Ok(payload) => {
                let series = parse_daily(&payload);
                debug!(bars = series.len(), "daily bars received");
                series
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch daily bars from Sectors");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self), name = "sectors::get_company_info")]
    async fn get_company_info(&self, symbol: &str) -> Option<Value> {
        match self.get_json(&format!("/company/{symbol}"), &[]).await {
            Ok(payload) => non_empty(payload),
            Err(e) => {
                warn!(error = %e, "failed to fetch company info from Sectors");
                None
            }
        }
    }

    #[instrument(skip(self), name = "sectors::search_stocks")]
    async fn search_stocks(&self, query: &str) -> Vec<StockListing> {
        match self.companies().await {
            Ok(listings) => filter_listings(listings, query),
            Err(e) => {
                warn!(error = %e, "failed to search Sectors companies");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self), name = "sectors::get_all_stocks")]
    async fn get_all_stocks(&self) -> Vec<StockListing> {
        match self.companies().await {
            Ok(listings) => listings,
            Err(e) => {
                warn!(error = %e, "failed to list Sectors companies");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self), name = "sectors::get_financials")]
    async fn get_financials(&self, symbol: &str) -> Option<Value> {
        match self.get_json(&format!("/financials/{symbol}"), &[]).await {
            Ok(payload) => non_empty(payload),
            Err(e) => {
                warn!(error = %e, "failed to fetch financials from Sectors");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_daily_sorts_and_skips_bad_rows() {
        let payload = json!([
            {"symbol": "BBCA", "date": "2024-01-03", "close": 9300, "volume": 100},
            {"symbol": "BBCA", "date": "2024-01-02", "close": 9150, "volume": 50},
            {"symbol": "BBCA", "date": "2024-01-04"},
        ]);
        let series = parse_daily(&payload);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].close, 9150.0);
        assert_eq!(series[1].close, 9300.0);
    }

    #[test]
    fn parse_daily_non_array_is_empty() {
        assert!(parse_daily(&json!({"detail": "not found"})).is_empty());
    }

    #[test]
    fn companies_and_search() {
        let payload = json!([
            {"symbol": "BBCA.JK", "company_name": "Bank Central Asia Tbk."},
            {"symbol": "BBRI.JK", "company_name": "Bank Rakyat Indonesia"},
            {"symbol": "TLKM.JK", "company_name": "Telkom Indonesia"},
        ]);
        let listings = parse_companies(&payload);
        assert_eq!(listings.len(), 3);

        let hits = filter_listings(listings.clone(), "bank");
        assert_eq!(hits.len(), 2);
        let hits = filter_listings(listings, "tlkm");
        assert_eq!(hits[0].name, "Telkom Indonesia");
    }

    #[test]
    fn empty_payloads_are_no_data() {
        assert!(non_empty(json!({})).is_none());
        assert!(non_empty(json!([])).is_none());
        assert!(non_empty(json!(null)).is_none());
        assert!(non_empty(json!({"eps": 1})).is_some());
    }

    #[test]
    fn default_window_spans_history_limit() {
        let client = SectorsClient::new("key", "https://example.invalid/v1/", 30).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let (start, got_end) = client.date_window(None, Some(end));
        assert_eq!(got_end, end);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());

        let explicit = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(client.date_window(Some(explicit), Some(end)).0, explicit);
    }

    #[test]
    fn debug_redacts_key() {
        let client = SectorsClient::new("secret-key", "https://example.invalid/v1", 365).unwrap();
        let text = format!("{client:?}");
        assert!(!text.contains("secret-key"));
        assert!(text.contains("example.invalid/v1"));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_no_data() {
        let client = SectorsClient::new("key", "http://127.0.0.1:9", 365)
            .unwrap()
            .with_min_interval(Duration::ZERO);
        assert!(client.get_stock_data("BBCA", "1d", None, None).await.is_empty());
        assert!(client.get_company_info("BBCA").await.is_none());
        assert!(client.search_stocks("bank").await.is_empty());
    }
}
