// =============================================================================
// Application Configuration
// =============================================================================
//
// Layered settings: serde defaults, then an optional JSON file, then process
// environment (including anything `.env` put there). Every field carries a
// serde default so a partial or empty file still loads.
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::fundamentals::ZeroRatioPolicy;

/// Company info, listings, search results and financials change slowly.
pub const REFERENCE_CACHE_TTL: Duration = Duration::from_secs(86_400);

pub const SECTORS_BASE_URL: &str = "https://api.sectors.app/v1";
pub const TWELVE_DATA_BASE_URL: &str = "https://api.twelvedata.com";

// =============================================================================
// Default-value helpers
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_app_env() -> String {
    "development".to_string()
}

fn default_backend_host() -> String {
    "127.0.0.1".to_string()
}

fn default_backend_port() -> u16 {
    8000
}

fn default_cache_dir() -> String {
    "data/cache".to_string()
}

fn default_cache_expiration() -> u64 {
    3600
}

fn default_max_historical_days() -> i64 {
    365
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

fn default_sectors_base_url() -> String {
    SECTORS_BASE_URL.to_string()
}

fn default_twelvedata_base_url() -> String {
    TWELVE_DATA_BASE_URL.to_string()
}

// =============================================================================
// AppConfig
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    // --- Environment --------------------------------------------------------
    #[serde(default = "default_app_env")]
    pub app_env: String,

    #[serde(default = "default_true")]
    pub debug: bool,

    // --- Server -------------------------------------------------------------
    #[serde(default = "default_backend_host")]
    pub backend_host: String,

    #[serde(default = "default_backend_port")]
    pub backend_port: u16,

    /// Allowed browser origins. A single `*` allows any origin.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    // --- Upstream providers -------------------------------------------------
    /// Sectors.app key. Empty disables the provider.
    #[serde(default)]
    pub sectors_api_key: String,

    /// Twelve Data key. Empty disables the provider.
    #[serde(default)]
    pub twelvedata_api_key: String,

    #[serde(default = "default_sectors_base_url")]
    pub sectors_base_url: String,

    #[serde(default = "default_twelvedata_base_url")]
    pub twelvedata_base_url: String,

    /// Look-back used for price history when the caller gives no start date.
    #[serde(default = "default_max_historical_days")]
    pub max_historical_days: i64,

    // --- Cache --------------------------------------------------------------
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    /// Max age of cached price series, seconds.
    #[serde(default = "default_cache_expiration")]
    pub cache_expiration: u64,

    #[serde(default = "default_true")]
    pub enable_cache: bool,

    // --- Logging ------------------------------------------------------------
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_true")]
    pub log_api_requests: bool,

    // --- Analysis -----------------------------------------------------------
    /// Report ratios that evaluate to exactly zero instead of dropping them.
    #[serde(default)]
    pub keep_zero_ratios: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_env: default_app_env(),
            debug: true,
            backend_host: default_backend_host(),
            backend_port: default_backend_port(),
            cors_origins: default_cors_origins(),
            sectors_api_key: String::new(),
            twelvedata_api_key: String::new(),
            sectors_base_url: default_sectors_base_url(),
            twelvedata_base_url: default_twelvedata_base_url(),
            max_historical_days: default_max_historical_days(),
            cache_dir: default_cache_dir(),
            cache_expiration: default_cache_expiration(),
            enable_cache: true,
            log_level: default_log_level(),
            log_api_requests: true,
            keep_zero_ratios: false,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &str| if key.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("AppConfig")
            .field("app_env", &self.app_env)
            .field("debug", &self.debug)
            .field("backend_host", &self.backend_host)
            .field("backend_port", &self.backend_port)
            .field("cors_origins", &self.cors_origins)
            .field("sectors_api_key", &redact(&self.sectors_api_key))
            .field("twelvedata_api_key", &redact(&self.twelvedata_api_key))
            .field("cache_dir", &self.cache_dir)
            .field("cache_expiration", &self.cache_expiration)
            .field("enable_cache", &self.enable_cache)
            .field("log_level", &self.log_level)
            .field("keep_zero_ratios", &self.keep_zero_ratios)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read app config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse app config from {}", path.display()))?;

        info!(path = %path.display(), app_env = %config.app_env, "app config loaded");
        Ok(config)
    }

    /// File (if present) plus process environment.
    pub fn from_env(path: impl AsRef<Path>) -> Self {
        let mut config = match Self::load(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(error = %e, "using default app config");
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Override fields from environment variables, read through `lookup`.
    /// Unparseable numbers are logged and leave the current value in place.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |raw: String| raw.trim().eq_ignore_ascii_case("true");

        if let Some(v) = lookup("APP_ENV") {
            self.app_env = v;
        }
        if let Some(v) = lookup("DEBUG") {
            self.debug = flag(v);
        }
        if let Some(v) = lookup("BACKEND_HOST") {
            self.backend_host = v;
        }
        if let Some(v) = lookup("BACKEND_PORT") {
            parse_into("BACKEND_PORT", &v, &mut self.backend_port);
        }
        if let Some(v) = lookup("SECTORS_API_KEY") {
            self.sectors_api_key = v.trim().to_string();
        }
        if let Some(v) = lookup("TWELVEDATA_API_KEY") {
            self.twelvedata_api_key = v.trim().to_string();
        }
        if let Some(v) = lookup("CACHE_DIR") {
            self.cache_dir = v;
        }
        if let Some(v) = lookup("CACHE_EXPIRATION") {
            parse_into("CACHE_EXPIRATION", &v, &mut self.cache_expiration);
        }
        if let Some(v) = lookup("ENABLE_CACHE") {
            self.enable_cache = flag(v);
        }
        if let Some(v) = lookup("MAX_HISTORICAL_DAYS") {
            parse_into("MAX_HISTORICAL_DAYS", &v, &mut self.max_historical_days);
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.log_level = v.trim().to_ascii_lowercase();
        }
        if let Some(v) = lookup("LOG_API_REQUESTS") {
            self.log_api_requests = flag(v);
        }
        if let Some(v) = lookup("CORS_ORIGINS") {
            self.cors_origins = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = lookup("KEEP_ZERO_RATIOS") {
            self.keep_zero_ratios = flag(v);
        }
    }

    /// At least one upstream key must be configured for data endpoints to work.
    pub fn validate(&self) -> Result<()> {
        if self.sectors_api_key.is_empty() && self.twelvedata_api_key.is_empty() {
            bail!("at least one API key (SECTORS_API_KEY or TWELVEDATA_API_KEY) is required");
        }
        if self.max_historical_days < 1 {
            bail!("MAX_HISTORICAL_DAYS must be positive, got {}", self.max_historical_days);
        }
        Ok(())
    }

    pub fn price_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_expiration)
    }

    pub fn zero_ratio_policy(&self) -> ZeroRatioPolicy {
        if self.keep_zero_ratios {
            ZeroRatioPolicy::KeepZero
        } else {
            ZeroRatioPolicy::DropZero
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.backend_host, self.backend_port)
    }
}

/// Log filter in force before the config file is read: `RUST_LOG`, else
/// `LOG_LEVEL`, else `info`.
pub fn startup_log_filter<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("RUST_LOG")
        .or_else(|| lookup("LOG_LEVEL").map(|v| v.trim().to_ascii_lowercase()))
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(default_log_level)
}

fn parse_into<T: std::str::FromStr>(key: &str, raw: &str, slot: &mut T) {
    match raw.trim().parse::<T>() {
        Ok(v) => *slot = v,
        Err(_) => warn!(key, value = raw, "ignoring unparseable environment value"),
    }
}
