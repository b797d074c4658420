//! TTL-based in-memory key-value store
//!
//! Values are stored as opaque JSON so a single cache instance can hold
//! payloads of different types; typed access goes through the `_json`
//! helpers which round-trip via serde.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::CacheTtl;

/// A stored value with its expiry bookkeeping. Never leaves the cache.
struct CacheEntry {
    value: Value,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) > self.ttl
    }
}

/// In-memory TTL cache.
///
/// Expired entries are evicted lazily on `get`/`has` and proactively by
/// `cleanup`, which the context runs on a fixed interval for entries that
/// are never read again. A miss is normal control flow, not an error.
pub struct TtlCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new(CacheTtl::DEFAULT)
    }
}

impl TtlCache {
    /// Create an empty cache with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Store a value under `key`, overwriting any existing entry.
    /// `ttl` defaults to the cache-wide default when not given.
    pub fn set(&self, key: &str, value: Value, ttl: Option<Duration>) {
        let entry = CacheEntry {
            value,
            stored_at: Instant::now(),
            ttl: ttl.unwrap_or(self.default_ttl),
        };
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .insert(key.to_string(), entry);
    }

    /// Get the value for `key` if present and fresh.
    /// An expired entry is removed as a side effect.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get(key) {
            Some(entry) if !entry.is_expired(Instant::now()) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Check whether a fresh entry exists for `key`.
    /// Same lazy-eviction side effect as `get`.
    pub fn has(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get(key) {
            Some(entry) if !entry.is_expired(Instant::now()) => true,
            Some(_) => {
                entries.remove(key);
                false
            }
            None => false,
        }
    }

    /// Remove the entry for `key` unconditionally.
    pub fn delete(&self, key: &str) {
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .remove(key);
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.lock().expect("cache mutex poisoned").clear();
    }

    /// Evict every expired entry. Returns the number evicted.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let evicted = before - entries.len();
        if evicted > 0 {
            log::debug!("Cache sweep evicted {} expired entries", evicted);
        }
        evicted
    }

    /// Number of physically present entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }

    /// Whether the cache holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store a serializable value. Serialization failures are logged and
    /// skipped; a value that can't be cached just misses next time.
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        match serde_json::to_value(value) {
            Ok(json) => self.set(key, json, ttl),
            Err(e) => log::warn!("Failed to serialize cache entry {}: {}", key, e),
        }
    }

    /// Get and deserialize a value. A payload that no longer matches `T`
    /// is treated as a miss.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|json| serde_json::from_value(json).ok())
    }

    /// Spawn the periodic sweep task. The handle is held by the owning
    /// context; aborting it stops the sweeps.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately; skip it
            ticker.tick().await;
            loop {
                ticker.tick().await;
                cache.cleanup();
            }
        })
    }
}
