// =============================================================================
// Cached provider decorator
// =============================================================================
//
// Wraps any provider with the on-disk JSON cache. Price series live for the
// configured price TTL; reference data (company info, listings, search
// results, financials) for a day. Empty results are never stored.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use super::MarketDataProvider;
use crate::cache::JsonCache;
use crate::config::REFERENCE_CACHE_TTL;
use crate::types::{PriceSeries, StockListing};

pub struct CachedProvider<P> {
    inner: P,
    cache: JsonCache,
    price_ttl: Duration,
}

impl<P: MarketDataProvider> CachedProvider<P> {
    pub fn new(inner: P, cache: JsonCache, price_ttl: Duration) -> Self {
        Self {
            inner,
            cache,
            price_ttl,
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn key(&self, params: Value) -> String {
        JsonCache::key(self.inner.name(), &params)
    }

    fn lookup<T: DeserializeOwned>(&self, key: &str, ttl: Duration) -> Option<T> {
        let hit = self.cache.read(key, ttl);
        if hit.is_some() {
            debug!(provider = self.inner.name(), key, "served from cache");
        }
        hit
    }

    fn store<T: Serialize>(&self, key: &str, value: &T, is_empty: bool) {
        if !is_empty {
            self.cache.write(key, value);
        }
    }
}

#[async_trait]
impl<P: MarketDataProvider> MarketDataProvider for CachedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn get_stock_data(
        &self,
        symbol: &str,
        interval: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> PriceSeries {
        let key = self.key(json!({
            "kind": "prices",
            "symbol": symbol,
            "interval": interval,
            "start": start_date,
            "end": end_date,
        }));
        if let Some(series) = self.lookup::<PriceSeries>(&key, self.price_ttl) {
            if !series.is_empty() {
                return series;
            }
        }
        let series = self
            .inner
            .get_stock_data(symbol, interval, start_date, end_date)
            .await;
        self.store(&key, &series, series.is_empty());
        series
    }

    async fn get_company_info(&self, symbol: &str) -> Option<Value> {
        let key = self.key(json!({"kind": "info", "symbol": symbol}));
        if let Some(info) = self.lookup(&key, REFERENCE_CACHE_TTL) {
            return Some(info);
        }
        let info = self.inner.get_company_info(symbol).await?;
        self.store(&key, &info, false);
        Some(info)
    }

    async fn search_stocks(&self, query: &str) -> Vec<StockListing> {
        let key = self.key(json!({"kind": "search", "query": query}));
        if let Some(hits) = self.lookup::<Vec<StockListing>>(&key, REFERENCE_CACHE_TTL) {
            if !hits.is_empty() {
                return hits;
            }
        }
        let hits = self.inner.search_stocks(query).await;
        self.store(&key, &hits, hits.is_empty());
        hits
    }

    async fn get_all_stocks(&self) -> Vec<StockListing> {
        let key = self.key(json!({"kind": "all_stocks"}));
        if let Some(all) = self.lookup::<Vec<StockListing>>(&key, REFERENCE_CACHE_TTL) {
            if !all.is_empty() {
                return all;
            }
        }
        let all = self.inner.get_all_stocks().await;
        self.store(&key, &all, all.is_empty());
        all
    }

    async fn get_financials(&self, symbol: &str) -> Option<Value> {
        let key = self.key(json!({"kind": "financials", "symbol": symbol}));
        if let Some(financials) = self.lookup(&key, REFERENCE_CACHE_TTL) {
            return Some(financials);
        }
        let financials = self.inner.get_financials(symbol).await?;
        self.store(&key, &financials, false);
        Some(financials)
    }
}
