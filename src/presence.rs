//! Concurrent presence cache keyed by encoded patterns.
//!
//! ## Architecture
//!
//! ```text
//!   set("1-3-56") ──► PatternEncoder::encode ──► 312725 ──► write lock ──► insert
//!   exists(..)    ──► PatternEncoder::encode ──► key    ──► read lock  ──► contains
//!
//!   RwLock<Option<FxHashSet<u64>>>
//!       Some(set)  live storage (Empty or Populated)
//!       None       released; re-created on the next insert
//! ```
//!
//! Encoding happens before any lock is taken, so a malformed pattern never
//! touches the storage.
//!
//! ## Lifecycle
//!
//! ```text
//!   Empty ──set──► Populated ──clear──► Empty        (capacity retained)
//!                      │
//!                      └──free──► Released ──set──► Populated (capacity from scratch)
//! ```
//!
//! ## Thread Safety
//!
//! A single `parking_lot::RwLock` guards the whole set. `set`, `insert`,
//! `clear` and `free` take it exclusively; `exists`, `len` and the other
//! read-only accessors share it.
//!
//! ## Example Usage
//!
//! ```
//! use presencekit::presence::{CacheState, PresenceCache};
//!
//! let cache = PresenceCache::new(1024);
//! cache.set("1-3-56").unwrap();
//! assert!(cache.exists("1\u{2013}3-56").unwrap());
//!
//! cache.clear();
//! assert_eq!(cache.state(), CacheState::Empty);
//! assert!(cache.retained_capacity() >= 1024);
//!
//! cache.free();
//! assert_eq!(cache.state(), CacheState::Released);
//! assert_eq!(cache.retained_capacity(), 0);
//!
//! cache.set("000000").unwrap();
//! assert!(cache.exists("000000").unwrap());
//! ```

use std::time::Duration;

use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::encoder::{PatternEncoder, PatternKey};
use crate::error::{EncodeError, ReleaseError};
use crate::keyspace::KeySpace;
#[cfg(feature = "metrics")]
use crate::metrics::counters::PresenceCounters;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::PresenceMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{MetricsReset, MetricsSnapshotProvider, PresenceMetricsRecorder};
use crate::reclaim::{DefaultProbe, ReclamationController, ReleaseOutcome};

/// Observable lifecycle state of a [`PresenceCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Storage allocated, no keys present.
    Empty,
    /// At least one key present.
    Populated,
    /// Storage dropped; reads behave as empty.
    Released,
}

/// Set of observed patterns shared across threads.
#[derive(Debug)]
pub struct PresenceCache {
    keys: RwLock<Option<FxHashSet<u64>>>,
    encoder: PatternEncoder,
    capacity_hint: usize,
    #[cfg(feature = "metrics")]
    metrics: PresenceCounters,
}

impl PresenceCache {
    /// Creates a cache over the default key space (base 11, six symbols).
    ///
    /// A zero `capacity_hint` pre-sizes for the whole key space, and larger
    /// hints are clamped to it. The hint is never a limit.
    pub fn new(capacity_hint: usize) -> Self {
        Self::with_key_space(capacity_hint, KeySpace::default())
    }

    /// Creates a cache over a custom key space.
    pub fn with_key_space(capacity_hint: usize, space: KeySpace) -> Self {
        let max_key = space.max_key_usize();
        let capacity_hint = if capacity_hint == 0 {
            max_key
        } else {
            capacity_hint.min(max_key)
        };
        let keys = FxHashSet::with_capacity_and_hasher(capacity_hint, Default::default());
        Self {
            keys: RwLock::new(Some(keys)),
            encoder: PatternEncoder::new(space),
            capacity_hint,
            #[cfg(feature = "metrics")]
            metrics: PresenceCounters::default(),
        }
    }

    /// Marks `pattern` as present. Repeated calls have no further effect.
    pub fn set(&self, pattern: &str) -> Result<(), EncodeError> {
        self.insert(pattern).map(|_| ())
    }

    /// Marks `pattern` as present, returning `true` if it was not already.
    pub fn insert(&self, pattern: &str) -> Result<bool, EncodeError> {
        let key = self.encode(pattern)?;
        Ok(self.insert_raw(key.get()))
    }

    /// Marks a pre-encoded key as present.
    pub fn set_key(&self, key: PatternKey) -> Result<bool, EncodeError> {
        self.check_key(key)?;
        Ok(self.insert_raw(key.get()))
    }

    /// Returns whether `pattern` has been set since the last clear or free.
    pub fn exists(&self, pattern: &str) -> Result<bool, EncodeError> {
        let key = self.encode(pattern)?;
        Ok(self.contains_raw(key.get()))
    }

    /// Returns whether a pre-encoded key is present.
    pub fn exists_key(&self, key: PatternKey) -> Result<bool, EncodeError> {
        self.check_key(key)?;
        Ok(self.contains_raw(key.get()))
    }

    /// Removes every key but keeps the allocated storage for reuse.
    ///
    /// A released cache stays released.
    pub fn clear(&self) {
        let mut guard = self.keys.write();
        if let Some(keys) = guard.as_mut() {
            let removed = keys.len();
            keys.clear();
            debug!(
                removed,
                retained_capacity = keys.capacity(),
                "presence cache cleared"
            );
        }
        drop(guard);

        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
    }

    /// Drops the backing storage entirely.
    ///
    /// The memory goes back to the allocator when this returns. The next
    /// insert re-creates storage from zero capacity.
    pub fn free(&self) {
        let dropped = self.keys.write().take();
        // Deallocate outside the lock.
        if let Some(keys) = dropped {
            debug!(
                entries = keys.len(),
                capacity = keys.capacity(),
                "presence cache storage released"
            );
            drop(keys);
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_free();
    }

    /// Frees the storage and waits up to `timeout` for the allocator to
    /// report pages returned to the OS.
    ///
    /// Uses [`DefaultProbe`]: jemalloc accounting with the `jemalloc` feature,
    /// otherwise no accounting at all, in which case this returns
    /// [`ReleaseOutcome::Unsupported`] right after freeing.
    pub fn release_and_confirm(&self, timeout: Duration) -> Result<ReleaseOutcome, ReleaseError> {
        ReclamationController::new(DefaultProbe::default()).release_and_confirm(self, timeout)
    }

    /// Number of distinct keys present.
    pub fn len(&self) -> usize {
        self.keys.read().as_ref().map_or(0, |keys| keys.len())
    }

    /// Returns `true` if no keys are present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity of the backing set; `0` once released.
    pub fn retained_capacity(&self) -> usize {
        self.keys.read().as_ref().map_or(0, |keys| keys.capacity())
    }

    /// Pre-sizing hint given at construction, resolved to the key-space size
    /// when zero or larger.
    pub fn capacity_hint(&self) -> usize {
        self.capacity_hint
    }

    /// Key space patterns are encoded into.
    pub fn key_space(&self) -> KeySpace {
        self.encoder.key_space()
    }

    /// Encoder used by this cache.
    pub fn encoder(&self) -> &PatternEncoder {
        &self.encoder
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CacheState {
        match self.keys.read().as_ref() {
            None => CacheState::Released,
            Some(keys) if keys.is_empty() => CacheState::Empty,
            Some(_) => CacheState::Populated,
        }
    }

    /// Present keys in ascending order.
    pub fn keys(&self) -> Vec<PatternKey> {
        let mut keys: Vec<PatternKey> = self
            .keys
            .read()
            .iter()
            .flatten()
            .copied()
            .map(PatternKey::new)
            .collect();
        keys.sort_unstable();
        keys
    }

    fn encode(&self, pattern: &str) -> Result<PatternKey, EncodeError> {
        let encoded = self.encoder.encode(pattern);
        #[cfg(feature = "metrics")]
        if encoded.is_err() {
            self.metrics.record_encode_error();
        }
        encoded
    }

    fn check_key(&self, key: PatternKey) -> Result<(), EncodeError> {
        let checked = self.encoder.check_key(key);
        #[cfg(feature = "metrics")]
        if checked.is_err() {
            self.metrics.record_encode_error();
        }
        checked
    }

    fn insert_raw(&self, key: u64) -> bool {
        let mut guard = self.keys.write();
        let keys = guard.get_or_insert_with(|| {
            debug!("re-allocating presence cache storage after release");
            #[cfg(feature = "metrics")]
            self.metrics.record_reallocation();
            FxHashSet::default()
        });
        let added = keys.insert(key);
        drop(guard);

        #[cfg(feature = "metrics")]
        self.metrics.record_set(added);
        added
    }

    fn contains_raw(&self, key: u64) -> bool {
        let found = self
            .keys
            .read()
            .as_ref()
            .is_some_and(|keys| keys.contains(&key));

        #[cfg(feature = "metrics")]
        self.metrics.record_exists(found);
        found
    }

    #[cfg(feature = "metrics")]
    pub(crate) fn record_release(&self, outcome: Result<&ReleaseOutcome, &ReleaseError>) {
        self.metrics.record_release(outcome);
    }
}

impl Default for PresenceCache {
    /// Pre-sized for the whole default key space.
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(feature = "metrics")]
impl MetricsSnapshotProvider<PresenceMetricsSnapshot> for PresenceCache {
    fn snapshot(&self) -> PresenceMetricsSnapshot {
        let (len, retained_capacity) = self
            .keys
            .read()
            .as_ref()
            .map_or((0, 0), |keys| (keys.len(), keys.capacity()));
        self.metrics
            .snapshot(len, retained_capacity, self.capacity_hint)
    }
}

#[cfg(feature = "metrics")]
impl MetricsReset for PresenceCache {
    fn reset_metrics(&self) {
        self.metrics.reset();
    }
}
