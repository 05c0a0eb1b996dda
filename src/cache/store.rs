//! In-memory result store with lazy TTL expiry.

use super::clock::{Clock, SystemClock};
use super::key::CacheKey;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Entry count above which `set` sweeps expired entries.
pub const DEFAULT_CLEANUP_THRESHOLD: usize = 100;

#[derive(Clone)]
struct CacheEntry<V> {
    value: V,
    created_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > ttl
    }
}

/// Read-only diagnostic snapshot of a [`ResultCache`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub active_entries: usize,
    pub expired_entries: usize,
    pub ttl_minutes: f64,
}

/// Memoizes values by request fingerprint for a fixed time window.
///
/// Expiry is lazy: an entry past its TTL stays in the map until a `get`
/// touches it or a `set` triggers a sweep. `get` never hands out an expired
/// value, and reads do not extend an entry's lifetime.
pub struct ResultCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    cleanup_threshold: usize,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> ResultCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            cleanup_threshold: DEFAULT_CLEANUP_THRESHOLD,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_ttl_minutes(minutes: u64) -> Self {
        Self::new(Duration::from_secs(minutes.saturating_mul(60)))
    }

    pub fn with_cleanup_threshold(mut self, threshold: usize) -> Self {
        self.cleanup_threshold = threshold;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn derive_key(description: &str, context: &str, model: &str) -> CacheKey {
        CacheKey::derive(description, context, model)
    }

    pub fn get(&self, description: &str, context: &str, model: &str) -> Option<V> {
        let key = CacheKey::derive(description, context, model);
        let now = self.clock.now();
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            match entries.get(key.as_str()) {
                None => {
                    debug!("Cache miss for key: {}...", key.short());
                    return None;
                }
                Some(entry) if !entry.is_expired(now, self.ttl) => {
                    debug!("Cache hit for key: {}...", key.short());
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        // Expired under the read lock; re-check under the write lock since a
        // concurrent `set` may have refreshed the slot in between.
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        match entries.get(key.as_str()) {
            Some(entry) if !entry.is_expired(now, self.ttl) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key.as_str());
                info!("Cache expired for key: {}...", key.short());
                None
            }
            None => None,
        }
    }

    pub fn set(&self, description: &str, context: &str, model: &str, value: V) {
        let key = CacheKey::derive(description, context, model);
        let now = self.clock.now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key.hash.clone(),
            CacheEntry {
                value,
                created_at: now,
            },
        );
        debug!("Cached result for key: {}...", key.short());

        if entries.len() > self.cleanup_threshold {
            let before = entries.len();
            entries.retain(|_, e| !e.is_expired(now, self.ttl));
            let removed = before - entries.len();
            if removed > 0 {
                info!("Cleaned up {} expired cache entries", removed);
            }
        }
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        info!("Cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let total_entries = entries.len();
        let active_entries = entries
            .values()
            .filter(|e| !e.is_expired(now, self.ttl))
            .count();
        CacheStats {
            total_entries,
            active_entries,
            expired_entries: total_entries - active_entries,
            ttl_minutes: self.ttl.as_secs_f64() / 60.0,
        }
    }

    /// Number of physically present entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
