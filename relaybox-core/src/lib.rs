#![warn(missing_docs)]
//! # relaybox-core
//!
//! Core traits and types for the relaybox adaptive fetching library.
//!
//! This crate provides the foundational types that make relaybox
//! **transport-agnostic**: the fetching engine (`relaybox`), the bounded
//! client cache (`relaybox-cache`), and transport implementations
//! (`relaybox-reqwest`) all build on the types defined here.
//!
//! ## Types
//!
//! - [`RelayEndpoint`] — a configured relay URL template with `{target}`
//!   substitution
//! - [`RelayId`] — identifies which path (direct or relayed) an attempt used
//! - [`AttemptOutcome`] — the transient record of a single attempt, consumed
//!   by the score tracker
//! - [`LookupKey`] — normalized cache key (lowercase, non-alphanumeric
//!   stripped)
//! - [`CacheValue`] — a value paired with its insertion timestamp

pub mod key;
pub mod relay;
pub mod value;

pub use key::LookupKey;
pub use relay::{AttemptOutcome, RelayEndpoint, RelayId, TARGET_PLACEHOLDER};
pub use value::CacheValue;

/// Raw byte payload type returned by transports.
/// Using `Bytes` provides efficient zero-copy cloning via reference counting.
pub type Raw = bytes::Bytes;
