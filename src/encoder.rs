//! Pattern-to-key encoding.
//!
//! ## Architecture
//!
//! A pattern is a fixed-length sequence of symbols, each a decimal digit or a
//! wildcard. Symbols are folded left to right, most significant first, into a
//! mixed-radix integer:
//!
//! ```text
//!   "1-3-56"   (base 11, wildcard = 10)
//!
//!   key = 0
//!   key = key*11 + 1     =        1
//!   key = key*11 + 10    =       21
//!   key = key*11 + 3     =      234
//!   key = key*11 + 10    =     2584
//!   key = key*11 + 5     =    28429
//!   key = key*11 + 6     =   312725
//! ```
//!
//! The fold order is part of the contract: reversing it would assign
//! different keys to the same patterns.
//!
//! ## Wildcards
//!
//! Several visually similar dash characters are accepted as the wildcard and
//! all map to the same digit value (`base - 1`). They are matched on Unicode
//! scalar values, so a three-byte en dash counts as a single symbol. The set is
//! closed; see [`WILDCARD_VARIANTS`].
//!
//! ## Example Usage
//!
//! ```
//! use presencekit::encoder::{decode, encode, normalize};
//!
//! let key = encode("1-3-56").unwrap();
//! assert_eq!(key.get(), 312_725);
//!
//! // En dash and hyphen-minus are the same wildcard.
//! assert_eq!(encode("1\u{2013}3-56").unwrap(), key);
//!
//! assert_eq!(decode(key).unwrap(), "1-3-56");
//! assert_eq!(normalize("1\u{2014}3-56").unwrap(), "1-3-56");
//! ```

use std::fmt;

use crate::error::EncodeError;
use crate::keyspace::KeySpace;

/// Canonical wildcard used by [`decode`] and [`normalize`].
pub const WILDCARD: char = '-';

/// Every symbol accepted as a wildcard.
pub const WILDCARD_VARIANTS: [char; 7] = [
    '-',        // HYPHEN-MINUS
    '\u{2013}', // EN DASH
    '\u{2014}', // EM DASH
    '\u{2212}', // MINUS SIGN
    '\u{2012}', // FIGURE DASH
    '\u{2010}', // HYPHEN
    '\u{2011}', // NON-BREAKING HYPHEN
];

/// Returns `true` if `symbol` is one of the accepted wildcard variants.
#[inline]
pub fn is_wildcard(symbol: char) -> bool {
    WILDCARD_VARIANTS.contains(&symbol)
}

/// Dense integer key of a pattern in `[0, max_key)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PatternKey(u64);

impl PatternKey {
    /// Wraps a raw key without range checking.
    ///
    /// Cache operations taking a `PatternKey` validate it against their key
    /// space.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer key.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<PatternKey> for u64 {
    #[inline]
    fn from(key: PatternKey) -> Self {
        key.0
    }
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Stateless encoder bound to a [`KeySpace`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternEncoder {
    space: KeySpace,
}

impl PatternEncoder {
    /// Creates an encoder for `space`.
    #[inline]
    pub fn new(space: KeySpace) -> Self {
        Self { space }
    }

    /// Returns the key space this encoder maps onto.
    #[inline]
    pub fn key_space(&self) -> KeySpace {
        self.space
    }

    /// Digit value of `symbol`, or `None` if it is not in the alphabet.
    ///
    /// Digits at or above the wildcard value are rejected so that reduced
    /// key spaces stay bijective.
    #[inline]
    pub fn symbol_value(&self, symbol: char) -> Option<u32> {
        let wildcard = self.space.wildcard_value();
        match symbol {
            '0'..='9' => {
                let digit = u32::from(symbol) - u32::from('0');
                (digit < wildcard).then_some(digit)
            },
            _ if is_wildcard(symbol) => Some(wildcard),
            _ => None,
        }
    }

    /// Encodes `pattern` into its key.
    ///
    /// Fails with [`EncodeError::InvalidLength`] when the symbol count differs
    /// from the key space length (checked before any symbol), and with
    /// [`EncodeError::InvalidSymbol`] for the first symbol outside the
    /// alphabet.
    pub fn encode(&self, pattern: &str) -> Result<PatternKey, EncodeError> {
        self.check_length(pattern)?;
        let base = u64::from(self.space.base());
        let mut key = 0u64;
        for (position, symbol) in pattern.chars().enumerate() {
            let value = self
                .symbol_value(symbol)
                .ok_or(EncodeError::InvalidSymbol { symbol, position })?;
            key = key * base + u64::from(value);
        }
        debug_assert!(self.space.contains(key));
        Ok(PatternKey(key))
    }

    /// Renders `key` back into its canonical pattern.
    ///
    /// Wildcard positions are rendered as [`WILDCARD`].
    pub fn decode(&self, key: PatternKey) -> Result<String, EncodeError> {
        self.check_key(key)?;
        let base = u64::from(self.space.base());
        let wildcard = u64::from(self.space.wildcard_value());
        let len = self.space.pattern_length();

        let mut symbols = vec![WILDCARD; len];
        let mut rest = key.0;
        for slot in symbols.iter_mut().rev() {
            let digit = rest % base;
            rest /= base;
            if digit != wildcard {
                // digit < wildcard <= 10
                *slot = char::from(b'0' + digit as u8);
            }
        }
        Ok(symbols.into_iter().collect())
    }

    /// Validates `pattern` and replaces every wildcard variant with
    /// [`WILDCARD`].
    pub fn normalize(&self, pattern: &str) -> Result<String, EncodeError> {
        self.check_length(pattern)?;
        pattern
            .chars()
            .enumerate()
            .map(|(position, symbol)| match self.symbol_value(symbol) {
                Some(_) if is_wildcard(symbol) => Ok(WILDCARD),
                Some(_) => Ok(symbol),
                None => Err(EncodeError::InvalidSymbol { symbol, position }),
            })
            .collect()
    }

    /// Fails with [`EncodeError::KeyOutOfRange`] unless `key` is in the space.
    #[inline]
    pub fn check_key(&self, key: PatternKey) -> Result<(), EncodeError> {
        if self.space.contains(key.0) {
            Ok(())
        } else {
            Err(EncodeError::KeyOutOfRange {
                key: key.0,
                max_key: self.space.max_key(),
            })
        }
    }

    fn check_length(&self, pattern: &str) -> Result<(), EncodeError> {
        let expected = self.space.pattern_length();
        let actual = pattern.chars().count();
        if actual == expected {
            Ok(())
        } else {
            Err(EncodeError::InvalidLength { expected, actual })
        }
    }
}

/// Encodes `pattern` in the default key space.
#[inline]
pub fn encode(pattern: &str) -> Result<PatternKey, EncodeError> {
    PatternEncoder::default().encode(pattern)
}

/// Decodes `key` in the default key space.
#[inline]
pub fn decode(key: PatternKey) -> Result<String, EncodeError> {
    PatternEncoder::default().decode(key)
}

/// Normalizes `pattern` in the default key space.
#[inline]
pub fn normalize(pattern: &str) -> Result<String, EncodeError> {
    PatternEncoder::default().normalize(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyspace::MAX_KEY;

    #[test]
    fn digits_fold_most_significant_first() {
        assert_eq!(encode("000000").unwrap().get(), 0);
        assert_eq!(encode("000001").unwrap().get(), 1);
        assert_eq!(encode("000010").unwrap().get(), 11);
        assert_eq!(encode("100000").unwrap().get(), 161_051);
        assert_eq!(encode("123456").unwrap().get(), 194_871);
    }

    #[test]
    fn wildcard_is_highest_digit() {
        assert_eq!(encode("00000-").unwrap().get(), 10);
        assert_eq!(encode("------").unwrap().get(), MAX_KEY - 1);
        assert_eq!(encode("1-3-56").unwrap().get(), 312_725);
    }

    #[test]
    fn every_wildcard_variant_encodes_identically() {
        let canonical = encode("1-3-56").unwrap();
        for variant in WILDCARD_VARIANTS {
            let pattern = format!("1{variant}3{variant}56");
            assert_eq!(encode(&pattern).unwrap(), canonical, "variant {variant:?}");
            assert!(is_wildcard(variant));
        }
    }

    #[test]
    fn wildcard_set_is_closed() {
        for symbol in ['\u{2015}', '\u{FE63}', '\u{FF0D}', '_', '~', '0'] {
            assert!(!is_wildcard(symbol), "{symbol:?}");
        }
    }

    #[test]
    fn length_counts_symbols_not_bytes() {
        // Six symbols, twelve bytes.
        let pattern = "\u{2014}\u{2014}\u{2014}123";
        assert_eq!(pattern.len(), 12);
        assert_eq!(encode(pattern).unwrap(), encode("---123").unwrap());
    }

    #[test]
    fn wrong_length_is_rejected_before_symbols() {
        assert_eq!(
            encode("12345").unwrap_err(),
            EncodeError::InvalidLength {
                expected: 6,
                actual: 5
            }
        );
        assert_eq!(
            encode("1234567").unwrap_err(),
            EncodeError::InvalidLength {
                expected: 6,
                actual: 7
            }
        );
        assert_eq!(
            encode("").unwrap_err(),
            EncodeError::InvalidLength {
                expected: 6,
                actual: 0
            }
        );
        // Bad symbol and bad length: length wins.
        assert!(matches!(
            encode("abc").unwrap_err(),
            EncodeError::InvalidLength { .. }
        ));
    }

    #[test]
    fn unknown_symbols_are_rejected_not_coerced() {
        assert_eq!(
            encode("12a456").unwrap_err(),
            EncodeError::InvalidSymbol {
                symbol: 'a',
                position: 2
            }
        );
        assert_eq!(
            encode("12345_").unwrap_err(),
            EncodeError::InvalidSymbol {
                symbol: '_',
                position: 5
            }
        );
        // Non-ASCII digits and dash lookalikes outside the closed set.
        for symbol in ['\u{0663}', '\u{FF11}', '\u{2015}', '\u{FE63}', ' ', '+'] {
            let pattern = format!("{symbol}23456");
            assert_eq!(
                encode(&pattern).unwrap_err(),
                EncodeError::InvalidSymbol {
                    symbol,
                    position: 0
                },
                "symbol {symbol:?}"
            );
        }
    }

    #[test]
    fn decode_renders_canonical_wildcard() {
        let key = encode("0\u{2212}\u{2212}999").unwrap();
        assert_eq!(decode(key).unwrap(), "0--999");
        assert_eq!(decode(PatternKey::new(0)).unwrap(), "000000");
        assert_eq!(decode(PatternKey::new(MAX_KEY - 1)).unwrap(), "------");
    }

    #[test]
    fn decode_rejects_out_of_range() {
        assert_eq!(
            decode(PatternKey::new(MAX_KEY)).unwrap_err(),
            EncodeError::KeyOutOfRange {
                key: MAX_KEY,
                max_key: MAX_KEY
            }
        );
    }

    #[test]
    fn normalize_validates_like_encode() {
        assert_eq!(normalize("\u{2010}\u{2011}0000").unwrap(), "--0000");
        assert!(matches!(
            normalize("x00000").unwrap_err(),
            EncodeError::InvalidSymbol { symbol: 'x', .. }
        ));
        assert!(matches!(
            normalize("0000").unwrap_err(),
            EncodeError::InvalidLength { actual: 4, .. }
        ));
    }

    #[test]
    fn reduced_space_is_a_bijection() {
        let encoder = PatternEncoder::new(KeySpace::new(3, 2).unwrap());
        let mut seen = Vec::new();
        for a in ['0', '1', '-'] {
            for b in ['0', '1', '-'] {
                let pattern: String = [a, b].into_iter().collect();
                let key = encoder.encode(&pattern).unwrap();
                assert!(key.get() < 9);
                assert_eq!(encoder.decode(key).unwrap(), pattern);
                seen.push(key);
            }
        }
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 9);

        // '2' would collide with the wildcard value in base 3.
        assert_eq!(
            encoder.encode("02").unwrap_err(),
            EncodeError::InvalidSymbol {
                symbol: '2',
                position: 1
            }
        );
    }

    #[test]
    fn symbol_value_covers_alphabet() {
        let encoder = PatternEncoder::default();
        for (i, digit) in ('0'..='9').enumerate() {
            assert_eq!(encoder.symbol_value(digit), Some(i as u32));
        }
        assert_eq!(encoder.symbol_value('\u{2013}'), Some(10));
        assert_eq!(encoder.symbol_value('a'), None);
    }
}
