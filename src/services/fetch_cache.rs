use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::domain::grid_snapshot::GridSnapshot;
use crate::services::feed_client::{FeedError, SnapshotSource};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Key/value store whose entries expire a fixed time after insertion.
pub struct TtlCache<K, V, C: Clock> {
    entries: HashMap<K, CacheEntry<V>>,
    ttl: Duration,
    clock: C,
}

impl<K: Eq + Hash, V: Clone, C: Clock> TtlCache<K, V, C> {
    pub fn new(ttl: Duration, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            clock,
        }
    }

    /// Returns a clone of the value if it has not expired yet. Expired entries are evicted.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let now = self.clock.now();
        match self.entries.get(key) {
            Some(entry) if now < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Windows reaching past the end of the calendar never expire.
    pub fn insert(&mut self, key: K, value: V) {
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Serves snapshots from a [`TtlCache`] while they are fresh and asks the
/// wrapped source otherwise. Failures are passed through and never stored.
pub struct CachedSnapshotSource<S: SnapshotSource, C: Clock> {
    inner: S,
    key: String,
    cache: Mutex<TtlCache<String, GridSnapshot, C>>,
}

impl<S: SnapshotSource, C: Clock> CachedSnapshotSource<S, C> {
    pub fn new(inner: S, key: &str, ttl: Duration, clock: C) -> Self {
        Self {
            inner,
            key: key.to_string(),
            cache: Mutex::new(TtlCache::new(ttl, clock)),
        }
    }

    // A panic while the lock was held leaves the entries intact, so keep using them.
    fn lock_cache(&self) -> MutexGuard<'_, TtlCache<String, GridSnapshot, C>> {
        self.cache.lock().unwrap_or_else(|poisoned| {
            warn!(key = %self.key, "snapshot cache lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl<S: SnapshotSource, C: Clock> SnapshotSource for CachedSnapshotSource<S, C> {
    fn fetch_snapshot(&self) -> Result<GridSnapshot, FeedError> {
        if let Some(snapshot) = self.lock_cache().get(&self.key) {
            debug!(key = %self.key, "serving grid snapshot from cache");
            return Ok(snapshot);
        }

        // Lock is released during the fetch; concurrent refills may both hit the network.
        let snapshot = self.inner.fetch_snapshot()?;
        self.lock_cache().insert(self.key.clone(), snapshot.clone());
        Ok(snapshot)
    }
}
