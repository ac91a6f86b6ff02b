//! On-disk response cache.
//!
//! Sits outside the aggregation core: the pipeline wraps each command in
//! `get_or_fetch`, keyed by command name plus its parameters, with a TTL per
//! provider. One JSON file per key:
//!
//! ```json
//! { "stored_at": "2024-07-01T12:00:00Z", "ttl_secs": 86400, "value": { ... } }
//! ```
//!
//! A corrupt or unreadable entry is a miss. A failed write is logged and the
//! fresh value is still returned.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    stored_at: DateTime<Utc>,
    ttl_secs: u64,
    value: serde_json::Value,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.stored_at);
        age.num_seconds() >= 0 && (age.num_seconds() as u64) < self.ttl_secs
    }
}

/// Command name plus ordered parameters, e.g. `treasury_tga__days=90`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn param(mut self, name: &str, value: impl Display) -> Self {
        self.0.push_str(&format!("__{name}={value}"));
        self
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Percent-escapes every byte outside `[A-Za-z0-9._=-]`, so distinct keys
    /// never share a file.
    fn file_name(&self) -> String {
        let mut safe = String::with_capacity(self.0.len());
        for byte in self.0.bytes() {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'=') {
                safe.push(char::from(byte));
            } else {
                safe.push_str(&format!("%{byte:02X}"));
            }
        }
        format!("{safe}.json")
    }
}

#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: Option<PathBuf>,
}

impl ResponseCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir: Some(dir) }
    }

    /// A cache that never stores anything; every call goes upstream.
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn get_or_fetch<T, F>(&self, key: &CacheKey, ttl: Duration, fetch: F) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, AppError>,
    {
        self.get_or_fetch_at(key, ttl, Utc::now(), fetch)
    }

    /// `get_or_fetch` with an explicit clock.
    pub fn get_or_fetch_at<T, F>(&self, key: &CacheKey, ttl: Duration, now: DateTime<Utc>, fetch: F) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, AppError>,
    {
        if let Some(hit) = self.get(key, now) {
            debug!(key = key.as_str(), "cache hit");
            return Ok(hit);
        }
        debug!(key = key.as_str(), "cache miss");

        let value = fetch()?;
        if let Err(e) = self.put(key, ttl, &value, now) {
            warn!(key = key.as_str(), error = %e, "failed to store cache entry");
        }
        Ok(value)
    }

    /// Fresh cached value for `key`, if any.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<T> {
        let path = self.entry_path(key)?;
        let content = fs::read_to_string(&path).ok()?;

        let entry: CacheEntry = match serde_json::from_str(&content) {
            Ok(e) => e,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "ignoring corrupt cache entry");
                return None;
            }
        };
        if !entry.is_fresh(now) {
            return None;
        }
        serde_json::from_value(entry.value).ok()
    }

    pub fn put<T: Serialize>(&self, key: &CacheKey, ttl: Duration, value: &T, now: DateTime<Utc>) -> Result<(), AppError> {
        let Some(path) = self.entry_path(key) else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::io(format!("Failed to create cache dir '{}': {e}", parent.display())))?;
        }

        let entry = CacheEntry {
            stored_at: now,
            ttl_secs: ttl.as_secs(),
            value: serde_json::to_value(value)
                .map_err(|e| AppError::io(format!("Failed to serialize cache entry: {e}")))?,
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| AppError::io(format!("Failed to serialize cache entry: {e}")))?;
        fs::write(&path, json)
            .map_err(|e| AppError::io(format!("Failed to write cache entry '{}': {e}", path.display())))?;

        debug!(key = key.as_str(), ttl_secs = ttl.as_secs(), "cache store");
        Ok(())
    }

    /// Remove every cache entry. Returns how many files were deleted.
    pub fn clear(&self) -> Result<usize, AppError> {
        let Some(dir) = &self.dir else {
            return Ok(0);
        };
        if !dir.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(dir)
            .map_err(|e| AppError::io(format!("Failed to read cache dir '{}': {e}", dir.display())))?;
        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path)
                    .map_err(|e| AppError::io(format!("Failed to remove '{}': {e}", path.display())))?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn entry_path(&self, key: &CacheKey) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.join(key.file_name()))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use chrono::TimeZone;
    use tempfile::TempDir;

    use super::*;
    use crate::domain::TrendPoint;
    use crate::error::ErrorKind;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
    }

    fn sample() -> Vec<TrendPoint> {
        vec![TrendPoint { date: "2024-01".to_string(), total_issuance: 120.0 }]
    }

    #[test]
    fn key_renders_params_and_safe_file_name() {
        let key = CacheKey::new("treasury.spread").param("long", "10 Year").param("short", "2y");
        assert_eq!(key.as_str(), "treasury.spread__long=10 Year__short=2y");
        assert_eq!(key.file_name(), "treasury.spread__long=10%20Year__short=2y.json");
    }

    #[test]
    fn distinct_keys_get_distinct_files() {
        let caret = CacheKey::new("stock").param("ticker", "^GSPC");
        let underscore = CacheKey::new("stock").param("ticker", "_GSPC");
        assert_eq!(caret.file_name(), "stock__ticker=%5EGSPC.json");
        assert_eq!(underscore.file_name(), "stock__ticker=_GSPC.json");

        let percent = CacheKey::new("stock").param("ticker", "%5EGSPC");
        assert_ne!(percent.file_name(), caret.file_name());
    }

    #[test]
    fn escaped_keys_round_trip_through_disk() {
        let tmp = TempDir::new().unwrap();
        let cache = ResponseCache::new(tmp.path().to_path_buf());
        let caret = CacheKey::new("stock").param("ticker", "^GSPC");
        let underscore = CacheKey::new("stock").param("ticker", "_GSPC");

        cache.put(&caret, Duration::from_secs(60), &1u32, t0()).unwrap();
        cache.put(&underscore, Duration::from_secs(60), &2u32, t0()).unwrap();
        assert_eq!(cache.get::<u32>(&caret, t0()), Some(1));
        assert_eq!(cache.get::<u32>(&underscore, t0()), Some(2));
    }

    #[test]
    fn hit_within_ttl_skips_fetch() {
        let tmp = TempDir::new().unwrap();
        let cache = ResponseCache::new(tmp.path().join("cache"));
        let key = CacheKey::new("trend").param("months", 12);
        let ttl = Duration::from_secs(3600);
        let calls = Cell::new(0);

        let first: Vec<TrendPoint> = cache
            .get_or_fetch_at(&key, ttl, t0(), || {
                calls.set(calls.get() + 1);
                Ok(sample())
            })
            .unwrap();
        let second: Vec<TrendPoint> = cache
            .get_or_fetch_at(&key, ttl, t0() + chrono::Duration::seconds(3599), || {
                calls.set(calls.get() + 1);
                Ok(Vec::new())
            })
            .unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn expired_entry_refetches() {
        let tmp = TempDir::new().unwrap();
        let cache = ResponseCache::new(tmp.path().to_path_buf());
        let key = CacheKey::new("trend");
        let ttl = Duration::from_secs(60);

        cache.put(&key, ttl, &sample(), t0()).unwrap();
        assert!(cache.get::<Vec<TrendPoint>>(&key, t0() + chrono::Duration::seconds(59)).is_some());
        assert!(cache.get::<Vec<TrendPoint>>(&key, t0() + chrono::Duration::seconds(60)).is_none());
    }

    #[test]
    fn corrupt_entry_is_a_miss() {
        let tmp = TempDir::new().unwrap();
        let cache = ResponseCache::new(tmp.path().to_path_buf());
        let key = CacheKey::new("trend");
        fs::write(tmp.path().join(key.file_name()), "{not json").unwrap();

        let out: Vec<TrendPoint> = cache
            .get_or_fetch_at(&key, Duration::from_secs(60), t0(), || Ok(sample()))
            .unwrap();
        assert_eq!(out, sample());
        // The fresh value replaced the corrupt file.
        assert!(cache.get::<Vec<TrendPoint>>(&key, t0()).is_some());
    }

    #[test]
    fn disabled_cache_always_fetches_and_propagates_errors() {
        let cache = ResponseCache::disabled();
        assert!(!cache.is_enabled());
        let key = CacheKey::new("x");
        let err = cache
            .get_or_fetch_at::<Vec<TrendPoint>, _>(&key, Duration::from_secs(60), t0(), || {
                Err(AppError::upstream("boom"))
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(cache.clear().unwrap(), 0);
    }

    #[test]
    fn clear_removes_entries() {
        let tmp = TempDir::new().unwrap();
        let cache = ResponseCache::new(tmp.path().to_path_buf());
        cache.put(&CacheKey::new("a"), Duration::from_secs(60), &1u32, t0()).unwrap();
        cache.put(&CacheKey::new("b"), Duration::from_secs(60), &2u32, t0()).unwrap();
        assert_eq!(cache.clear().unwrap(), 2);
        assert!(cache.get::<u32>(&CacheKey::new("a"), t0()).is_none());
    }
}
