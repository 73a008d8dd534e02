//! Cached value type with insertion timestamp.
//!
//! [`CacheValue`] wraps a payload with the wall-clock time it entered the
//! cache. Entries are immutable once created: a cache hit never refreshes
//! `inserted_at`, so an entry's age only ever grows until it is evicted or
//! expires.
//!
//! ## Expiry boundary
//!
//! [`CacheValue::is_expired`] is strict: an entry whose age **exceeds** the
//! TTL is expired, one whose age equals the TTL is still fresh. This is the
//! documented side of the exact-TTL boundary.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// A cached value paired with its insertion timestamp.
///
/// The serialized form matches the persisted store layout:
/// `{"value": ..., "insertedAt": ...}`.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use relaybox_core::CacheValue;
///
/// let value = CacheValue::new("payload");
/// assert!(!value.is_expired(Duration::from_secs(60)));
/// assert_eq!(value.into_inner(), "payload");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CacheValue<T> {
    #[serde(rename = "value")]
    data: T,
    #[serde(rename = "insertedAt")]
    inserted_at: DateTime<Utc>,
}

impl<T> CacheValue<T> {
    /// Creates a cache value inserted now.
    pub fn new(data: T) -> Self {
        Self::with_timestamp(data, Utc::now())
    }

    /// Creates a cache value with an explicit insertion timestamp.
    ///
    /// Used when restoring entries from a persisted store, where the
    /// original insertion time must survive a process restart.
    pub fn with_timestamp(data: T, inserted_at: DateTime<Utc>) -> Self {
        Self { data, inserted_at }
    }

    /// Returns a reference to the cached payload.
    #[inline]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Returns when this value was inserted.
    #[inline]
    pub fn inserted_at(&self) -> DateTime<Utc> {
        self.inserted_at
    }

    /// Consumes the value and returns the inner payload.
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Returns the age of this entry, saturating to zero if the insertion
    /// timestamp is in the future (clock adjustments).
    pub fn age(&self) -> Duration {
        Utc::now()
            .signed_duration_since(self.inserted_at)
            .to_std()
            .unwrap_or_default()
    }

    /// Whether this entry's age strictly exceeds `ttl`.
    ///
    /// An entry whose age equals the TTL exactly is still considered fresh.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }
}
