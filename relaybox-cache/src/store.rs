//! Persisted backing store for the bounded cache.
//!
//! The store is the analogue of browser local storage in the original
//! setting: entries survive a process restart as `{value, insertedAt}`
//! pairs keyed by the rendered lookup key. The cache remains the source of
//! truth while running; the store is only read at startup and written on
//! demand.
//!
//! Storage failures are never allowed to break a fetch path: corrupt
//! persisted data is discarded (not repaired) and the cache starts empty,
//! while save failures are logged and swallowed by the caller.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use relaybox_core::{CacheValue, LookupKey};

use crate::BoundedCache;

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying storage failed (I/O, quota).
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Persisted data failed to serialize or deserialize.
    #[error("corrupt persisted data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A persisted key/value store backing a [`BoundedCache`].
#[async_trait]
pub trait Store<T>: Send + Sync {
    /// Loads all persisted entries. An empty store is `Ok(vec![])`;
    /// unreadable data is an error so the caller can discard it.
    async fn load(&self) -> Result<Vec<(LookupKey, CacheValue<T>)>, StoreError>;

    /// Replaces the persisted contents with `entries`.
    async fn save(&self, entries: &[(LookupKey, CacheValue<T>)]) -> Result<(), StoreError>;

    /// Drops all persisted data. Called when a load reports corruption.
    async fn discard(&self) -> Result<(), StoreError>;
}

/// Store persisting entries as a single JSON object on disk.
///
/// The file layout is a map from rendered lookup key to
/// `{"value": ..., "insertedAt": ...}`:
///
/// ```json
/// {"search:thematrix1999": {"value": "...", "insertedAt": "2026-08-29T10:00:00Z"}}
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store persisting to `path`. The file is created on first
    /// save; a missing file loads as empty.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The on-disk location of this store.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl<T> Store<T> for JsonFileStore
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn load(&self) -> Result<Vec<(LookupKey, CacheValue<T>)>, StoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let map: HashMap<String, CacheValue<T>> = serde_json::from_slice(&raw)?;
        Ok(map
            .into_iter()
            .map(|(rendered, value)| (LookupKey::from_rendered(&rendered), value))
            .collect())
    }

    async fn save(&self, entries: &[(LookupKey, CacheValue<T>)]) -> Result<(), StoreError> {
        let map: HashMap<String, &CacheValue<T>> = entries
            .iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        let raw = serde_json::to_vec(&map)?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }

    async fn discard(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

impl<T> BoundedCache<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync,
{
    /// Fills the cache from a persisted store, skipping entries that
    /// expired while on disk.
    ///
    /// A load failure (corrupt or unreadable data) is recovered by
    /// discarding the persisted data and starting empty; it is logged but
    /// never surfaced, since the cache is an optimization rather than a
    /// source of truth.
    pub async fn restore_from<S: Store<T>>(&self, store: &S) {
        match store.load().await {
            Ok(entries) => {
                let ttl = self.ttl();
                for (key, value) in entries {
                    if !value.is_expired(ttl) {
                        self.insert_value(key, value);
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable persisted cache");
                if let Err(err) = store.discard().await {
                    tracing::warn!(error = %err, "failed to discard persisted cache");
                }
            }
        }
    }

    /// Persists the current live entries, logging and swallowing failures.
    pub async fn persist_to<S: Store<T>>(&self, store: &S) {
        let entries = self.snapshot();
        if let Err(err) = store.save(&entries).await {
            tracing::warn!(error = %err, "failed to persist cache entries");
        }
    }
}
