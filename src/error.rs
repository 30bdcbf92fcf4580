//! Error types for the presencekit library.
//!
//! ## Key Components
//!
//! - [`EncodeError`]: Returned when a pattern (or a pre-encoded key) does not
//!   belong to the configured key space. Surfaced verbatim by every cache
//!   operation that takes a pattern.
//! - [`ReleaseError`]: Returned when OS-level memory release could not be
//!   confirmed within a deadline. Non-fatal: the cache is already released.
//! - [`ConfigError`]: Returned when key-space or builder parameters are invalid
//!   (e.g. a base larger than the alphabet, a zero pattern length).
//!
//! ## Example Usage
//!
//! ```
//! use presencekit::error::EncodeError;
//! use presencekit::encoder::encode;
//!
//! let err = encode("12345").unwrap_err();
//! assert_eq!(err, EncodeError::InvalidLength { expected: 6, actual: 5 });
//!
//! let err = encode("12a456").unwrap_err();
//! assert!(err.to_string().contains("'a'"));
//! ```

use std::time::Duration;

use thiserror::Error;

use crate::reclaim::MemoryStats;

// ---------------------------------------------------------------------------
// EncodeError
// ---------------------------------------------------------------------------

/// Error returned when a pattern cannot be mapped onto the key space.
///
/// A failed encode never mutates a cache: callers can retry with a corrected
/// pattern without observing partial state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The pattern's symbol count differs from the configured length.
    #[error("pattern must be exactly {expected} symbols, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// A symbol is neither a valid digit nor a recognized wildcard.
    #[error("invalid symbol {symbol:?} at position {position}")]
    InvalidSymbol { symbol: char, position: usize },

    /// A pre-encoded key lies outside `[0, max_key)`.
    #[error("key {key} is outside the key space [0, {max_key})")]
    KeyOutOfRange { key: u64, max_key: u64 },
}

// ---------------------------------------------------------------------------
// ReleaseError
// ---------------------------------------------------------------------------

/// Error returned by
/// [`ReclamationController::release_and_confirm`](crate::reclaim::ReclamationController::release_and_confirm).
///
/// Timing out is an expected outcome: the allocator is free to keep pages
/// around. The cache has already dropped its storage when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReleaseError {
    /// The bytes-returned-to-OS signal did not rise before the deadline.
    #[error(
        "timeout after {timeout:?} waiting for OS memory release: \
         returned_to_os before={} current={}",
        .before.returned_to_os,
        .current.returned_to_os
    )]
    Timeout {
        timeout: Duration,
        before: MemoryStats,
        current: MemoryStats,
    },
}

impl ReleaseError {
    /// Returns `true` if the release confirmation timed out.
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when key-space or cache configuration parameters are invalid.
///
/// Produced by [`KeySpace::new`](crate::keyspace::KeySpace::new) and
/// [`PresenceCacheBuilder::try_build`](crate::builder::PresenceCacheBuilder::try_build).
/// Carries a human-readable description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use presencekit::keyspace::KeySpace;
///
/// let err = KeySpace::new(12, 6).unwrap_err();
/// assert!(err.to_string().contains("base"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- EncodeError ------------------------------------------------------

    #[test]
    fn invalid_length_display_names_both_counts() {
        let err = EncodeError::InvalidLength {
            expected: 6,
            actual: 7,
        };
        assert_eq!(err.to_string(), "pattern must be exactly 6 symbols, got 7");
    }

    #[test]
    fn invalid_symbol_display_includes_symbol() {
        let err = EncodeError::InvalidSymbol {
            symbol: 'x',
            position: 3,
        };
        assert_eq!(err.to_string(), "invalid symbol 'x' at position 3");
    }

    #[test]
    fn key_out_of_range_display() {
        let err = EncodeError::KeyOutOfRange {
            key: 2_000_000,
            max_key: 1_771_561,
        };
        assert!(err.to_string().contains("2000000"));
        assert!(err.to_string().contains("1771561"));
    }

    #[test]
    fn encode_error_implements_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<EncodeError>();
    }

    // -- ReleaseError -----------------------------------------------------

    #[test]
    fn timeout_display_reports_signal() {
        let before = MemoryStats {
            allocated: 10,
            obtained_from_os: 100,
            returned_to_os: 4096,
        };
        let err = ReleaseError::Timeout {
            timeout: Duration::from_millis(250),
            before,
            current: before,
        };
        assert!(err.is_timeout());
        let msg = err.to_string();
        assert!(msg.contains("250ms"));
        assert!(msg.contains("before=4096"));
        assert!(msg.contains("current=4096"));
    }

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("pattern_length must be > 0");
        assert_eq!(err.to_string(), "pattern_length must be > 0");
    }

    #[test]
    fn config_message_accessor() {
        let err = ConfigError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn config_clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }
}
