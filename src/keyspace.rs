//! Key-space configuration: alphabet size and pattern length.
//!
//! A [`KeySpace`] fixes the radix `base` (digits `0..=base-2` plus one wildcard
//! whose digit value is `base - 1`) and the number of symbols per pattern.
//! Every encoded key lies in `[0, base^pattern_length)`.
//!
//! ## Example
//!
//! ```
//! use presencekit::keyspace::{KeySpace, MAX_KEY};
//!
//! let space = KeySpace::default();
//! assert_eq!(space.base(), 11);
//! assert_eq!(space.pattern_length(), 6);
//! assert_eq!(space.max_key(), MAX_KEY);
//!
//! // Ternary patterns of two symbols: digits 0, 1 and the wildcard.
//! let small = KeySpace::new(3, 2).unwrap();
//! assert_eq!(small.max_key(), 9);
//! ```

use crate::error::ConfigError;

/// Default alphabet size: ten decimal digits plus the wildcard.
pub const BASE: u32 = 11;

/// Default number of symbols per pattern.
pub const PATTERN_LENGTH: usize = 6;

/// Size of the default key space, `BASE^PATTERN_LENGTH`.
pub const MAX_KEY: u64 = (BASE as u64).pow(PATTERN_LENGTH as u32);

/// Smallest usable base: one digit plus the wildcard.
const MIN_BASE: u32 = 2;

/// Validated radix and length of the pattern alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpace {
    base: u32,
    pattern_length: usize,
    max_key: u64,
}

impl KeySpace {
    /// Creates a key space, validating that the alphabet fits in ten digits
    /// plus a wildcard and that `base^pattern_length` fits in `u64`/`usize`.
    pub fn new(base: u32, pattern_length: usize) -> Result<Self, ConfigError> {
        if !(MIN_BASE..=BASE).contains(&base) {
            return Err(ConfigError::new(format!(
                "base must be in {MIN_BASE}..={BASE}, got {base}"
            )));
        }
        if pattern_length == 0 {
            return Err(ConfigError::new("pattern_length must be > 0"));
        }
        let max_key = u32::try_from(pattern_length)
            .ok()
            .and_then(|len| u64::from(base).checked_pow(len))
            .filter(|max| usize::try_from(*max).is_ok())
            .ok_or_else(|| {
                ConfigError::new(format!(
                    "key space {base}^{pattern_length} overflows the key type"
                ))
            })?;
        Ok(Self {
            base,
            pattern_length,
            max_key,
        })
    }

    /// Radix of the encoding (alphabet size including the wildcard).
    #[inline]
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Number of symbols in every pattern.
    #[inline]
    pub fn pattern_length(&self) -> usize {
        self.pattern_length
    }

    /// Exclusive upper bound of encoded keys.
    #[inline]
    pub fn max_key(&self) -> u64 {
        self.max_key
    }

    /// Digit value assigned to every wildcard variant.
    #[inline]
    pub fn wildcard_value(&self) -> u32 {
        self.base - 1
    }

    /// Returns `true` if `key` lies in `[0, max_key)`.
    #[inline]
    pub fn contains(&self, key: u64) -> bool {
        key < self.max_key
    }

    /// Key-space size as a `usize`, used to pre-size storage.
    #[inline]
    pub(crate) fn max_key_usize(&self) -> usize {
        // Checked in `new`.
        self.max_key as usize
    }
}

impl Default for KeySpace {
    /// Base 11, six symbols.
    fn default() -> Self {
        Self {
            base: BASE,
            pattern_length: PATTERN_LENGTH,
            max_key: MAX_KEY,
        }
    }
}
