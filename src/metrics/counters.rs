use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ReleaseError;
use crate::metrics::snapshot::PresenceMetricsSnapshot;
use crate::metrics::traits::PresenceMetricsRecorder;
use crate::reclaim::ReleaseOutcome;

/// Atomic counters behind [`PresenceMetricsSnapshot`].
#[derive(Debug, Default)]
pub(crate) struct PresenceCounters {
    set_new: AtomicU64,
    set_duplicate: AtomicU64,
    exists_hits: AtomicU64,
    exists_misses: AtomicU64,
    encode_errors: AtomicU64,
    clear_calls: AtomicU64,
    free_calls: AtomicU64,
    reallocations: AtomicU64,
    releases_confirmed: AtomicU64,
    releases_unsupported: AtomicU64,
    release_timeouts: AtomicU64,
}

#[inline]
fn incr(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl PresenceCounters {
    /// Snapshot counters together with gauges read by the caller.
    pub(crate) fn snapshot(
        &self,
        len: usize,
        retained_capacity: usize,
        capacity_hint: usize,
    ) -> PresenceMetricsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        let set_new = load(&self.set_new);
        let set_duplicate = load(&self.set_duplicate);
        let exists_hits = load(&self.exists_hits);
        let exists_misses = load(&self.exists_misses);
        PresenceMetricsSnapshot {
            set_calls: set_new + set_duplicate,
            set_new,
            set_duplicate,
            exists_calls: exists_hits + exists_misses,
            exists_hits,
            exists_misses,
            encode_errors: load(&self.encode_errors),
            clear_calls: load(&self.clear_calls),
            free_calls: load(&self.free_calls),
            reallocations: load(&self.reallocations),
            releases_confirmed: load(&self.releases_confirmed),
            releases_unsupported: load(&self.releases_unsupported),
            release_timeouts: load(&self.release_timeouts),
            len,
            retained_capacity,
            capacity_hint,
        }
    }

    pub(crate) fn reset(&self) {
        for counter in [
            &self.set_new,
            &self.set_duplicate,
            &self.exists_hits,
            &self.exists_misses,
            &self.encode_errors,
            &self.clear_calls,
            &self.free_calls,
            &self.reallocations,
            &self.releases_confirmed,
            &self.releases_unsupported,
            &self.release_timeouts,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl PresenceMetricsRecorder for PresenceCounters {
    fn record_set(&self, added: bool) {
        if added {
            incr(&self.set_new);
        } else {
            incr(&self.set_duplicate);
        }
    }

    fn record_exists(&self, found: bool) {
        if found {
            incr(&self.exists_hits);
        } else {
            incr(&self.exists_misses);
        }
    }

    fn record_encode_error(&self) {
        incr(&self.encode_errors);
    }

    fn record_clear(&self) {
        incr(&self.clear_calls);
    }

    fn record_free(&self) {
        incr(&self.free_calls);
    }

    fn record_reallocation(&self) {
        incr(&self.reallocations);
    }

    fn record_release(&self, outcome: Result<&ReleaseOutcome, &ReleaseError>) {
        match outcome {
            Ok(ReleaseOutcome::Confirmed { .. }) => incr(&self.releases_confirmed),
            Ok(ReleaseOutcome::Unsupported) => incr(&self.releases_unsupported),
            Err(_) => incr(&self.release_timeouts),
        }
    }
}
