#![no_main]

use std::collections::HashSet;

use libfuzzer_sys::fuzz_target;
use presencekit::encoder::{PatternKey, decode};
use presencekit::keyspace::MAX_KEY;
use presencekit::presence::{CacheState, PresenceCache};

// Fuzz arbitrary operation sequences on PresenceCache
//
// Tests random sequences of set, exists, clear and free against a HashSet
// model, checking membership, len and lifecycle state after every step.
fuzz_target!(|data: &[u8]| {
    let cache = PresenceCache::new(64);
    let mut model: HashSet<u64> = HashSet::new();
    let mut released = false;

    for chunk in data.chunks_exact(4) {
        let op = chunk[0] % 8;
        let raw = u64::from(u32::from_le_bytes([chunk[1], chunk[2], chunk[3], 0])) % MAX_KEY;
        let pattern = decode(PatternKey::new(raw)).unwrap();

        match op {
            0..=3 => {
                let added = cache.insert(&pattern).unwrap();
                assert_eq!(added, model.insert(raw));
                released = false;
            }
            4 | 5 => {
                assert_eq!(cache.exists(&pattern).unwrap(), model.contains(&raw));
            }
            6 => {
                cache.clear();
                model.clear();
            }
            _ => {
                cache.free();
                model.clear();
                released = true;
                assert_eq!(cache.retained_capacity(), 0);
            }
        }

        assert_eq!(cache.len(), model.len());
        let expected = match (released, model.is_empty()) {
            (true, _) => CacheState::Released,
            (false, true) => CacheState::Empty,
            (false, false) => CacheState::Populated,
        };
        assert_eq!(cache.state(), expected);
    }
});
