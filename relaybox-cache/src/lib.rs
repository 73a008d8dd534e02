#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

mod bounded;
mod cleanup;
mod store;

pub use bounded::{
    BoundedCache, DEFAULT_MAX_ENTRIES, DEFAULT_METADATA_TTL, DEFAULT_TRAILER_TTL,
};
pub use store::{JsonFileStore, Store, StoreError};

pub use relaybox_core::{CacheValue, LookupKey};
