//! Fixed-capacity TTL cache with exact LRU eviction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use relaybox_core::{CacheValue, LookupKey};

/// Default capacity for a client cache.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Default TTL for metadata lookups (search results, detail records).
pub const DEFAULT_METADATA_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Default TTL for trailer lookups, which go stale faster.
pub const DEFAULT_TRAILER_TTL: Duration = Duration::from_secs(30 * 60);

/// A fixed-capacity, time-expiring key/value store with LRU eviction.
///
/// The handle is cheap to clone; all clones share one entry map. Recency is
/// tracked with a monotonically increasing touch counter bumped on every
/// `get` hit and every `insert`, which gives exact (not sampled) LRU order.
///
/// Two invariants hold at all times:
///
/// - `len() <= max_entries` after any [`insert`](Self::insert) returns;
/// - an entry is never returned to a caller once its age strictly exceeds
///   the TTL (the expiry check happens lazily on read, and the expired
///   entry is deleted as a side effect).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use relaybox_cache::{BoundedCache, LookupKey};
///
/// let cache = BoundedCache::new(100, Duration::from_secs(2 * 60 * 60));
/// let key = LookupKey::new("search", "The Matrix");
/// cache.insert(key.clone(), "payload".to_owned());
/// assert_eq!(cache.get(&key).map(|v| v.into_inner()).as_deref(), Some("payload"));
/// ```
#[derive(Debug)]
pub struct BoundedCache<T> {
    inner: Arc<Mutex<Inner<T>>>,
    max_entries: usize,
    ttl: Duration,
}

impl<T> Clone for BoundedCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            max_entries: self.max_entries,
            ttl: self.ttl,
        }
    }
}

#[derive(Debug)]
struct Inner<T> {
    entries: HashMap<LookupKey, Slot<T>>,
    tick: u64,
}

#[derive(Debug)]
struct Slot<T> {
    value: CacheValue<T>,
    touched: u64,
}

impl<T: Clone> BoundedCache<T> {
    /// Creates a cache holding at most `max_entries` entries, each valid for
    /// `ttl` after insertion. A capacity of zero is clamped to one.
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                tick: 0,
            })),
            max_entries: max_entries.max(1),
            ttl,
        }
    }

    /// Looks up a key, returning the entry with its insertion timestamp.
    ///
    /// Returns `None` for unseen keys and for entries older than the TTL;
    /// an expired entry is deleted as a side effect of the read. A hit
    /// bumps the entry's LRU recency but never changes `inserted_at`, so
    /// repeated reads of an unexpired key observe the identical value.
    pub fn get(&self, key: &LookupKey) -> Option<CacheValue<T>> {
        let mut inner = self.lock();
        let expired = inner.entries.get(key)?.value.is_expired(self.ttl);
        if expired {
            inner.entries.remove(key);
            tracing::trace!(%key, "expired entry removed on read");
            return None;
        }
        inner.tick += 1;
        let tick = inner.tick;
        // The entry was checked present under this same lock guard.
        let slot = inner.entries.get_mut(key)?;
        slot.touched = tick;
        Some(slot.value.clone())
    }

    /// Inserts a value with a fresh insertion timestamp.
    ///
    /// Overwriting an existing key resets its age and counts as a recency
    /// touch. When the cache is at capacity and the key is new, the
    /// least-recently-used entry is evicted first, so `len()` never exceeds
    /// the configured maximum.
    pub fn insert(&self, key: LookupKey, value: T) {
        self.insert_value(key, CacheValue::new(value));
    }

    /// Inserts an entry preserving its original insertion timestamp.
    ///
    /// Used when restoring entries from a persisted [`Store`]; eviction and
    /// recency behave exactly as for [`insert`](Self::insert).
    ///
    /// [`Store`]: crate::Store
    pub fn insert_value(&self, key: LookupKey, value: CacheValue<T>) {
        let mut inner = self.lock();
        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.max_entries {
            if let Some(lru) = inner
                .entries
                .iter()
                .min_by_key(|(_, slot)| slot.touched)
                .map(|(key, _)| key.clone())
            {
                inner.entries.remove(&lru);
                tracing::trace!(key = %lru, "evicted least-recently-used entry");
            }
        }
        inner.tick += 1;
        let touched = inner.tick;
        inner.entries.insert(key, Slot { value, touched });
    }

    /// Removes every entry older than the TTL, returning how many were
    /// removed. Intended to run on a periodic timer so memory stays bounded
    /// even when expired keys are never read again.
    pub fn cleanup_expired(&self) -> usize {
        let mut inner = self.lock();
        let before = inner.entries.len();
        let ttl = self.ttl;
        inner.entries.retain(|_, slot| !slot.value.is_expired(ttl));
        before - inner.entries.len()
    }

    /// Returns all live entries, for persisting to a [`Store`].
    ///
    /// [`Store`]: crate::Store
    pub fn snapshot(&self) -> Vec<(LookupKey, CacheValue<T>)> {
        let ttl = self.ttl;
        self.lock()
            .entries
            .iter()
            .filter(|(_, slot)| !slot.value.is_expired(ttl))
            .map(|(key, slot)| (key.clone(), slot.value.clone()))
            .collect()
    }

    /// Current number of entries, including not-yet-collected expired ones.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    /// Configured maximum entry count.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// A poisoned lock only means a panic happened mid-operation elsewhere;
    /// the map itself stays structurally valid, so keep serving.
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
