// =============================================================================
// On-disk JSON response cache
// =============================================================================
//
// One file per request: `{dir}/{provider}_{sha256(params)}.json`. Freshness
// is judged from the file's modification time against a max age supplied by
// the reader. Writes are atomic (tmp file + rename), so a concurrent reader
// sees either the old entry or the new one.
// =============================================================================

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct JsonCache {
    dir: PathBuf,
}

impl JsonCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Stable key for a provider request. `params` is hashed in its canonical
    /// JSON form; object keys serialize sorted, so insertion order is irrelevant.
    pub fn key(provider: &str, params: &Value) -> String {
        let canonical = params.to_string();
        let digest = Sha256::digest(canonical.as_bytes());
        format!("{provider}_{}", hex::encode(digest))
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Cached value for `key` if present, readable and younger than `max_age`.
    /// Expired entries are removed.
    pub fn read<T: DeserializeOwned>(&self, key: &str, max_age: Duration) -> Option<T> {
        let path = self.entry_path(key);
        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);

        if age > max_age {
            debug!(key, age_secs = age.as_secs(), "cache entry expired");
            if let Err(e) = fs::remove_file(&path) {
                warn!(key, error = %e, "failed to remove expired cache entry");
            }
            return None;
        }

        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(value) => {
                debug!(key, "cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "ignoring corrupt cache entry");
                None
            }
        }
    }

    /// Store `value` under `key`. Failures are logged, never raised.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_write(key, value) {
            warn!(key, error = %e, "failed to write cache entry");
        }
    }

    fn try_write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create cache dir {}", self.dir.display()))?;

        let path = self.entry_path(key);
        let tmp_path = path.with_extension("json.tmp");
        let content = serde_json::to_vec(value).context("failed to serialise cache entry")?;

        fs::write(&tmp_path, content)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            anyhow::anyhow!("atomic rename to {} failed: {e}", path.display())
        })?;

        debug!(key, "cache entry written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn backdate(path: &Path, by: Duration) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - by).unwrap();
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonCache::new(dir.path());
        cache.write("k1", &vec![1.5, 2.5]);
        let got: Option<Vec<f64>> = cache.read("k1", Duration::from_secs(60));
        assert_eq!(got, Some(vec![1.5, 2.5]));
    }

    #[test]
    fn missing_entry_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonCache::new(dir.path());
        assert_eq!(cache.read::<Value>("absent", Duration::from_secs(60)), None);
    }

    #[test]
    fn expired_entry_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonCache::new(dir.path());
        cache.write("old", &json!({"a": 1}));
        let path = dir.path().join("old.json");
        backdate(&path, Duration::from_secs(7200));

        assert_eq!(cache.read::<Value>("old", Duration::from_secs(3600)), None);
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_entry_is_none() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        let cache = JsonCache::new(dir.path());
        assert_eq!(cache.read::<Value>("bad", Duration::from_secs(60)), None);
    }

    #[test]
    fn write_creates_directory_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let cache = JsonCache::new(&nested);
        cache.write("x", &json!([1, 2, 3]));
        assert!(nested.join("x.json").exists());
        assert!(!nested.join("x.json.tmp").exists());
    }

    #[test]
    fn key_ignores_param_order_but_not_provider() {
        let a = JsonCache::key("sectors", &json!({"symbol": "BBCA", "interval": "1d"}));
        let b = JsonCache::key("sectors", &json!({"interval": "1d", "symbol": "BBCA"}));
        let c = JsonCache::key("twelve_data", &json!({"symbol": "BBCA", "interval": "1d"}));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("sectors_"));
        assert_eq!(a.len(), "sectors_".len() + 64);
    }
}
