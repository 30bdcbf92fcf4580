//! Builder for presence caches.
//!
//! Collects the key-space parameters and the capacity hint, validating them
//! together in [`PresenceCacheBuilder::try_build`].
//!
//! ## Example
//!
//! ```rust
//! use presencekit::builder::PresenceCacheBuilder;
//!
//! let cache = PresenceCacheBuilder::new()
//!     .capacity_hint(4096)
//!     .pattern_length(4)
//!     .try_build()
//!     .unwrap();
//! cache.set("12-4").unwrap();
//! assert!(cache.exists("12-4").unwrap());
//! assert_eq!(cache.key_space().max_key(), 14_641);
//! ```

use crate::error::ConfigError;
use crate::keyspace::{BASE, KeySpace, PATTERN_LENGTH};
use crate::presence::PresenceCache;

/// Builder for creating [`PresenceCache`] instances.
#[derive(Debug, Clone, Copy)]
pub struct PresenceCacheBuilder {
    capacity_hint: usize,
    base: u32,
    pattern_length: usize,
}

impl PresenceCacheBuilder {
    /// Starts from the default key space and a zero (whole key space) hint.
    pub fn new() -> Self {
        Self {
            capacity_hint: 0,
            base: BASE,
            pattern_length: PATTERN_LENGTH,
        }
    }

    /// Expected number of distinct patterns; `0` pre-sizes for the whole
    /// key space.
    pub fn capacity_hint(mut self, capacity_hint: usize) -> Self {
        self.capacity_hint = capacity_hint;
        self
    }

    /// Alphabet size including the wildcard.
    pub fn base(mut self, base: u32) -> Self {
        self.base = base;
        self
    }

    /// Symbols per pattern.
    pub fn pattern_length(mut self, pattern_length: usize) -> Self {
        self.pattern_length = pattern_length;
        self
    }

    /// Uses an already validated key space.
    pub fn key_space(mut self, space: KeySpace) -> Self {
        self.base = space.base();
        self.pattern_length = space.pattern_length();
        self
    }

    /// Builds the cache, rejecting an invalid key space.
    ///
    /// # Example
    ///
    /// ```rust
    /// use presencekit::builder::PresenceCacheBuilder;
    ///
    /// let err = PresenceCacheBuilder::new().base(16).try_build().unwrap_err();
    /// assert!(err.message().contains("base"));
    /// ```
    pub fn try_build(self) -> Result<PresenceCache, ConfigError> {
        let space = KeySpace::new(self.base, self.pattern_length)?;
        Ok(PresenceCache::with_key_space(self.capacity_hint, space))
    }
}

impl Default for PresenceCacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyspace::MAX_KEY;

    #[test]
    fn defaults_match_plain_constructor() {
        let cache = PresenceCacheBuilder::new().try_build().unwrap();
        assert_eq!(cache.key_space(), KeySpace::default());
        assert_eq!(cache.capacity_hint(), MAX_KEY as usize);
    }

    #[test]
    fn custom_space_and_hint() {
        let cache = PresenceCacheBuilder::new()
            .base(4)
            .pattern_length(3)
            .capacity_hint(10)
            .try_build()
            .unwrap();
        assert_eq!(cache.capacity_hint(), 10);
        assert_eq!(cache.key_space().max_key(), 64);
        cache.set("2-1").unwrap();
        assert!(cache.set("3-1").is_err());
    }

    #[test]
    fn key_space_overrides_parameters() {
        let space = KeySpace::new(7, 2).unwrap();
        let cache = PresenceCacheBuilder::new()
            .base(2)
            .key_space(space)
            .capacity_hint(1)
            .try_build()
            .unwrap();
        assert_eq!(cache.key_space(), space);
    }

    #[test]
    fn oversized_hint_builds() {
        let cache = PresenceCacheBuilder::new()
            .capacity_hint(usize::MAX)
            .try_build()
            .unwrap();
        assert_eq!(cache.capacity_hint(), MAX_KEY as usize);
        cache.set("000000").unwrap();
        assert!(cache.exists("000000").unwrap());
    }

    #[test]
    fn invalid_length_is_config_error() {
        let err = PresenceCacheBuilder::new()
            .pattern_length(0)
            .try_build()
            .unwrap_err();
        assert!(err.message().contains("pattern_length"));
    }
}
