//! Normalized cache key construction.
//!
//! This module provides [`LookupKey`], the key type used by the bounded
//! client cache and its persisted backing store.
//!
//! ## Normalization
//!
//! Raw inputs (typically user-facing titles or search terms) are normalized
//! with explicit rules so that trivially different spellings of the same
//! lookup share one cache entry:
//!
//! 1. Lowercase the input.
//! 2. Keep ASCII alphanumeric characters.
//! 3. Strip everything else (whitespace, punctuation, non-ASCII).
//!
//! ```
//! use relaybox_core::LookupKey;
//!
//! let key = LookupKey::new("search", "The Matrix (1999)");
//! assert_eq!(key.normalized(), "thematrix1999");
//! assert_eq!(format!("{}", key), "search:thematrix1999");
//! ```
//!
//! ## Collisions
//!
//! Distinct raw inputs can normalize to the same key (`"Seven"` and
//! `"SE7EN"` do not, but `"Heat!"` and `"(heat)"` do). This is a deliberate
//! design decision, not a bug: a collision merely serves one lookup the
//! cached payload of another lookup that normalizes identically, and the
//! entry expires on its normal TTL. Callers that cannot tolerate collisions
//! should disambiguate through the prefix.

use std::fmt;

use smol_str::SmolStr;

/// A normalized cache key with an optional namespace prefix.
///
/// Keys render as `prefix:normalized` (or just `normalized` when the prefix
/// is empty). The normalized component only ever contains `[a-z0-9]`, so the
/// rendered form can be parsed back unambiguously with
/// [`LookupKey::from_rendered`].
///
/// # Example
///
/// ```
/// use relaybox_core::LookupKey;
///
/// let key = LookupKey::new("trailer", "Blade Runner 2049");
/// assert_eq!(key.prefix(), "trailer");
/// assert_eq!(key.normalized(), "bladerunner2049");
///
/// let bare = LookupKey::bare("Blade Runner 2049");
/// assert_eq!(format!("{}", bare), "bladerunner2049");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct LookupKey {
    prefix: SmolStr,
    normalized: SmolStr,
}

impl LookupKey {
    /// Creates a key under the given namespace prefix from a raw input.
    pub fn new(prefix: impl Into<SmolStr>, raw: &str) -> Self {
        Self {
            prefix: prefix.into(),
            normalized: SmolStr::new(Self::normalize(raw)),
        }
    }

    /// Creates a key with no namespace prefix.
    pub fn bare(raw: &str) -> Self {
        Self::new("", raw)
    }

    /// Applies the normalization rules: lowercase, ASCII alphanumerics kept,
    /// everything else stripped.
    ///
    /// An input with no alphanumeric content normalizes to the empty string;
    /// such keys are valid and collide with each other by construction.
    pub fn normalize(raw: &str) -> String {
        raw.to_lowercase()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect()
    }

    /// Returns the namespace prefix (may be empty).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the normalized key component.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Parses a key from its rendered `prefix:normalized` form.
    ///
    /// The normalized component never contains `:`, so the split happens at
    /// the last colon; a rendered form without a colon is a bare key.
    pub fn from_rendered(rendered: &str) -> Self {
        match rendered.rsplit_once(':') {
            Some((prefix, normalized)) => Self {
                prefix: SmolStr::new(prefix),
                normalized: SmolStr::new(normalized),
            },
            None => Self {
                prefix: SmolStr::default(),
                normalized: SmolStr::new(rendered),
            },
        }
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "{}", self.normalized)
        } else {
            write!(f, "{}:{}", self.prefix, self.normalized)
        }
    }
}
