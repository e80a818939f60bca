// =============================================================================
// Shared Application State
// =============================================================================
//
// Handed to every handler as `Arc<AppState>`. Providers are optional: a
// missing API key leaves the slot empty and the dependent endpoints answer
// 503 instead of failing at startup.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::cache::JsonCache;
use crate::config::AppConfig;
use crate::providers::{CachedProvider, MarketDataProvider, SectorsClient, TwelveDataClient};

pub type SharedProvider = Arc<dyn MarketDataProvider>;

pub struct AppState {
    pub config: AppConfig,
    pub sectors: Option<SharedProvider>,
    pub twelve_data: Option<SharedProvider>,
    analyses_served: AtomicU64,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        sectors: Option<SharedProvider>,
        twelve_data: Option<SharedProvider>,
    ) -> Self {
        Self {
            config,
            sectors,
            twelve_data,
            analyses_served: AtomicU64::new(0),
        }
    }

    /// Build the upstream clients the configuration has keys for, each
    /// wrapped in the response cache unless caching is disabled.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let sectors = if config.sectors_api_key.is_empty() {
            None
        } else {
            let client = SectorsClient::new(
                &config.sectors_api_key,
                config.sectors_base_url.clone(),
                config.max_historical_days,
            )?;
            Some(with_cache(client, &config))
        };

        let twelve_data = if config.twelvedata_api_key.is_empty() {
            None
        } else {
            let client = TwelveDataClient::new(
                config.twelvedata_api_key.clone(),
                config.twelvedata_base_url.clone(),
            )?;
            Some(with_cache(client, &config))
        };

        info!(
            sectors = sectors.is_some(),
            twelve_data = twelve_data.is_some(),
            cache = config.enable_cache,
            "data providers configured"
        );

        Ok(Self::new(config, sectors, twelve_data))
    }

    /// Sectors when configured, otherwise Twelve Data.
    pub fn primary_provider(&self) -> Option<&SharedProvider> {
        self.sectors.as_ref().or(self.twelve_data.as_ref())
    }

    pub fn record_analysis(&self) -> u64 {
        self.analyses_served.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn analyses_served(&self) -> u64 {
        self.analyses_served.load(Ordering::Relaxed)
    }
}

fn with_cache<P: MarketDataProvider + 'static>(client: P, config: &AppConfig) -> SharedProvider {
    if config.enable_cache {
        let cache = JsonCache::new(&config.cache_dir);
        Arc::new(CachedProvider::new(client, cache, config.price_cache_ttl()))
    } else {
        Arc::new(client)
    }
}
