#![no_main]

use libfuzzer_sys::fuzz_target;
use presencekit::encoder::{decode, encode, is_wildcard, normalize};
use presencekit::error::EncodeError;
use presencekit::keyspace::MAX_KEY;

// Fuzz the encoder with arbitrary UTF-8 input
//
// Valid patterns must land in range and round-trip through decode; invalid
// ones must fail with the error matching the first violation.
fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let symbols: Vec<char> = input.chars().collect();
    match encode(input) {
        Ok(key) => {
            assert_eq!(symbols.len(), 6);
            assert!(key.get() < MAX_KEY);
            let normalized = normalize(input).unwrap();
            assert_eq!(decode(key).unwrap(), normalized);
            assert_eq!(encode(&normalized).unwrap(), key);
        }
        Err(EncodeError::InvalidLength { expected, actual }) => {
            assert_eq!(expected, 6);
            assert_eq!(actual, symbols.len());
            assert_ne!(actual, 6);
        }
        Err(EncodeError::InvalidSymbol { symbol, position }) => {
            assert_eq!(symbols.len(), 6);
            assert_eq!(symbols[position], symbol);
            assert!(!symbol.is_ascii_digit() && !is_wildcard(symbol));
            // Everything before the offending symbol is valid.
            assert!(
                symbols[..position]
                    .iter()
                    .all(|c| c.is_ascii_digit() || is_wildcard(*c))
            );
        }
        Err(EncodeError::KeyOutOfRange { .. }) => {
            panic!("encode never reports key range errors");
        }
    }
});
