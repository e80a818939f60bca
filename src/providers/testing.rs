use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};

use super::MarketDataProvider;
use crate::types::{PriceBar, PriceSeries, StockListing};

/// In-memory provider that counts upstream calls.
#[derive(Default)]
pub struct StubProvider {
    pub bars: PriceSeries,
    pub info: Option<Value>,
    pub listings: Vec<StockListing>,
    pub financials: Option<Value>,
    calls: AtomicUsize,
}

impl StubProvider {
    /// `n` daily bars on a gentle uptrend, plus info and one listing.
    pub fn with_bars(n: usize) -> Self {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let bars = (0..n)
            .map(|i| {
                let close = 9000.0 + i as f64 * 10.0 + (i % 3) as f64 * 5.0;
                PriceBar::new(
                    start + Duration::days(i as i64),
                    close - 5.0,
                    close + 20.0,
                    close - 20.0,
                    close,
                    1_000_000.0 + (i % 4) as f64 * 1000.0,
                )
            })
            .collect();
        Self {
            bars,
            info: Some(json!({"symbol": "BBCA", "company_name": "Bank Central Asia"})),
            listings: vec![StockListing {
                symbol: "BBCA".into(),
                name: "Bank Central Asia".into(),
            }],
            ..Self::default()
        }
    }

    /// No bars, only a financials payload.
    pub fn with_financials(financials: Value) -> Self {
        Self {
            financials: Some(financials),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MarketDataProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn get_stock_data(
        &self,
        _symbol: &str,
        _interval: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> PriceSeries {
        self.hit();
        self.bars
            .iter()
            .filter(|b| start_date.map_or(true, |s| b.timestamp.date_naive() >= s))
            .filter(|b| end_date.map_or(true, |e| b.timestamp.date_naive() <= e))
            .copied()
            .collect()
    }

    async fn get_company_info(&self, _symbol: &str) -> Option<Value> {
        self.hit();
        self.info.clone()
    }

    async fn search_stocks(&self, query: &str) -> Vec<StockListing> {
        self.hit();
        let needle = query.to_lowercase();
        self.listings
            .iter()
            .filter(|l| l.symbol.to_lowercase().contains(&needle) || l.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    async fn get_all_stocks(&self) -> Vec<StockListing> {
        self.hit();
        self.listings.clone()
    }

    async fn get_financials(&self, _symbol: &str) -> Option<Value> {
        self.hit();
        self.financials.clone()
    }
}
