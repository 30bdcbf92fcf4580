//! Hard release of cache storage with OS-visible confirmation.
//!
//! ## Architecture
//!
//! ```text
//!   ReclamationController::release_and_confirm(cache, timeout)
//!
//!     1. cache.free()                   storage dropped, memory back to the allocator
//!     2. probe.collect(); baseline      refresh allocator statistics
//!        └─ no statistics ──────────►   Ok(Unsupported)      (capability gap)
//!     3. probe.release_to_os()          ask the allocator to purge free pages
//!     4. poll every tick until deadline
//!        ├─ returned_to_os > baseline   Ok(Confirmed)
//!        └─ deadline passed             Err(ReleaseError::Timeout)
//! ```
//!
//! Deallocation in Rust is deterministic, so step 1 already hands the memory
//! back to the allocator. Whether the allocator gives pages back to the
//! operating system is allocator policy; steps 2-4 ask for that and observe
//! it through a [`MemoryProbe`].
//!
//! A timeout is not a failure of the cache: its storage is gone either way
//! and it remains usable.
//!
//! ## Probes
//!
//! - [`UnsupportedProbe`]: no accounting; release returns
//!   [`ReleaseOutcome::Unsupported`] immediately after freeing.
//! - `JemallocProbe` (feature `jemalloc`): jemalloc statistics and arena
//!   purging. Only meaningful with jemalloc as the global allocator.
//!
//! ## Example Usage
//!
//! ```
//! use std::time::Duration;
//!
//! use presencekit::presence::PresenceCache;
//! use presencekit::reclaim::{ReclamationController, ReleaseOutcome, UnsupportedProbe};
//!
//! let cache = PresenceCache::new(1024);
//! cache.set("123456").unwrap();
//!
//! let controller = ReclamationController::new(UnsupportedProbe);
//! let outcome = controller
//!     .release_and_confirm(&cache, Duration::from_secs(1))
//!     .unwrap();
//! assert_eq!(outcome, ReleaseOutcome::Unsupported);
//! assert_eq!(cache.retained_capacity(), 0);
//! ```

#[cfg(feature = "jemalloc")]
mod jemalloc;

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

#[cfg(feature = "jemalloc")]
pub use jemalloc::JemallocProbe;

use crate::error::ReleaseError;
use crate::presence::PresenceCache;

/// Default polling tick between statistics reads.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Probe used by [`PresenceCache::release_and_confirm`].
#[cfg(feature = "jemalloc")]
pub type DefaultProbe = JemallocProbe;

/// Probe used by [`PresenceCache::release_and_confirm`].
#[cfg(not(feature = "jemalloc"))]
pub type DefaultProbe = UnsupportedProbe;

/// Allocator-level memory accounting, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// Bytes currently allocated by the application.
    pub allocated: u64,
    /// Bytes the allocator has obtained from the OS.
    pub obtained_from_os: u64,
    /// Bytes the allocator has handed back to the OS.
    pub returned_to_os: u64,
}

impl fmt::Display for MemoryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "allocated={} KiB obtained={} KiB returned={} KiB",
            self.allocated / 1024,
            self.obtained_from_os / 1024,
            self.returned_to_os / 1024
        )
    }
}

/// Source of memory statistics and release requests.
pub trait MemoryProbe: Send + Sync {
    /// Current statistics, or `None` if the host offers no accounting.
    fn stats(&self) -> Option<MemoryStats>;

    /// Requests a collection pass or statistics refresh.
    fn collect(&self) {}

    /// Requests that free pages be returned to the OS.
    fn release_to_os(&self) {}
}

impl<P: MemoryProbe + ?Sized> MemoryProbe for &P {
    fn stats(&self) -> Option<MemoryStats> {
        (**self).stats()
    }

    fn collect(&self) {
        (**self).collect()
    }

    fn release_to_os(&self) {
        (**self).release_to_os()
    }
}

/// Probe for hosts without memory accounting.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedProbe;

impl MemoryProbe for UnsupportedProbe {
    fn stats(&self) -> Option<MemoryStats> {
        None
    }
}

/// Successful result of [`ReclamationController::release_and_confirm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The bytes-returned-to-OS signal rose above the baseline.
    Confirmed {
        before: MemoryStats,
        after: MemoryStats,
    },
    /// Storage freed; the probe offers no accounting to confirm with.
    Unsupported,
}

impl ReleaseOutcome {
    /// Returns `true` if release was observed.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    /// Bytes returned to the OS between baseline and confirmation.
    pub fn returned_bytes(&self) -> u64 {
        match self {
            Self::Confirmed { before, after } => {
                after.returned_to_os.saturating_sub(before.returned_to_os)
            },
            Self::Unsupported => 0,
        }
    }
}

/// Drives hard release of a [`PresenceCache`] and waits for confirmation.
#[derive(Debug, Clone)]
pub struct ReclamationController<P> {
    probe: P,
    poll_interval: Duration,
}

impl<P: MemoryProbe> ReclamationController<P> {
    /// Creates a controller polling every [`DEFAULT_POLL_INTERVAL`].
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the polling tick. A zero interval is raised to 1 ms.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Returns the probe.
    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Polling tick between statistics reads.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Frees `cache` and waits up to `timeout` for the allocator to report
    /// bytes returned to the OS.
    ///
    /// Always terminates. On [`ReleaseError::Timeout`] the cache is already
    /// released and usable; only the confirmation is missing.
    pub fn release_and_confirm(
        &self,
        cache: &PresenceCache,
        timeout: Duration,
    ) -> Result<ReleaseOutcome, ReleaseError> {
        let result = self.release(cache, timeout);

        #[cfg(feature = "metrics")]
        cache.record_release(result.as_ref());

        result
    }

    fn release(
        &self,
        cache: &PresenceCache,
        timeout: Duration,
    ) -> Result<ReleaseOutcome, ReleaseError> {
        let deadline = Instant::now() + timeout;
        cache.free();

        self.probe.collect();
        let Some(before) = self.probe.stats() else {
            info!("memory accounting unavailable; release not confirmed");
            return Ok(ReleaseOutcome::Unsupported);
        };
        debug!(%before, ?timeout, "requesting release of freed pages");
        self.probe.release_to_os();

        loop {
            self.probe.collect();
            let current = self.probe.stats().unwrap_or(before);
            if current.returned_to_os > before.returned_to_os {
                debug!(
                    returned = current.returned_to_os - before.returned_to_os,
                    "memory release confirmed"
                );
                return Ok(ReleaseOutcome::Confirmed {
                    before,
                    after: current,
                });
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(%before, %current, ?timeout, "timed out waiting for memory release");
                return Err(ReleaseError::Timeout {
                    timeout,
                    before,
                    current,
                });
            }
            thread::sleep(self.poll_interval.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    use super::*;
    use crate::presence::CacheState;

    /// Reports `returned_to_os` rising by `step` after `release_to_os` has
    /// been called and `delay` reads have passed.
    #[derive(Debug, Default)]
    struct StepProbe {
        released: AtomicUsize,
        reads: AtomicUsize,
        delay: usize,
        step: u64,
        returned: AtomicU64,
    }

    impl MemoryProbe for StepProbe {
        fn stats(&self) -> Option<MemoryStats> {
            if self.released.load(Ordering::SeqCst) > 0
                && self.reads.fetch_add(1, Ordering::SeqCst) >= self.delay
            {
                self.returned.fetch_add(self.step, Ordering::SeqCst);
            }
            Some(MemoryStats {
                allocated: 1 << 20,
                obtained_from_os: 8 << 20,
                returned_to_os: self.returned.load(Ordering::SeqCst),
            })
        }

        fn release_to_os(&self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn populated() -> PresenceCache {
        let cache = PresenceCache::new(128);
        for i in 0..100 {
            cache.set(&format!("{i:06}")).unwrap();
        }
        cache
    }

    #[test]
    fn confirms_when_signal_rises() {
        let cache = populated();
        let probe = StepProbe {
            delay: 2,
            step: 4096,
            ..StepProbe::default()
        };
        let controller =
            ReclamationController::new(&probe).with_poll_interval(Duration::from_millis(1));

        let outcome = controller
            .release_and_confirm(&cache, Duration::from_secs(5))
            .unwrap();
        assert!(outcome.is_confirmed());
        assert_eq!(outcome.returned_bytes(), 4096);
        assert_eq!(probe.released.load(Ordering::SeqCst), 1);
        assert_eq!(cache.state(), CacheState::Released);
    }

    #[test]
    fn times_out_when_signal_is_flat() {
        let cache = populated();
        let probe = StepProbe::default();
        let controller =
            ReclamationController::new(&probe).with_poll_interval(Duration::from_millis(5));

        let started = Instant::now();
        let err = controller
            .release_and_confirm(&cache, Duration::from_millis(60))
            .unwrap_err();
        assert!(started.elapsed() >= Duration::from_millis(60));
        assert!(err.is_timeout());
        let ReleaseError::Timeout {
            before, current, ..
        } = err;
        assert_eq!(before.returned_to_os, current.returned_to_os);

        // Released regardless, and reusable.
        assert_eq!(cache.state(), CacheState::Released);
        assert!(!cache.exists("000050").unwrap());
        cache.set("000050").unwrap();
        assert!(cache.exists("000050").unwrap());
    }

    #[test]
    fn zero_timeout_still_checks_once() {
        let cache = populated();
        let probe = StepProbe {
            step: 1,
            ..StepProbe::default()
        };
        let outcome = ReclamationController::new(&probe)
            .release_and_confirm(&cache, Duration::ZERO)
            .unwrap();
        assert!(outcome.is_confirmed());
    }

    #[test]
    fn unsupported_probe_returns_immediately() {
        let cache = populated();
        let controller = ReclamationController::new(UnsupportedProbe);
        let started = Instant::now();
        let outcome = controller
            .release_and_confirm(&cache, Duration::from_secs(30))
            .unwrap();
        assert_eq!(outcome, ReleaseOutcome::Unsupported);
        assert_eq!(outcome.returned_bytes(), 0);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(cache.retained_capacity(), 0);
    }

    #[test]
    fn poll_interval_has_floor() {
        let controller = ReclamationController::new(UnsupportedProbe)
            .with_poll_interval(Duration::ZERO);
        assert_eq!(controller.poll_interval(), Duration::from_millis(1));
        assert_eq!(
            ReclamationController::new(UnsupportedProbe).poll_interval(),
            DEFAULT_POLL_INTERVAL
        );
    }

    #[test]
    fn stats_display_in_kib() {
        let stats = MemoryStats {
            allocated: 2048,
            obtained_from_os: 10 * 1024,
            returned_to_os: 4096,
        };
        assert_eq!(
            stats.to_string(),
            "allocated=2 KiB obtained=10 KiB returned=4 KiB"
        );
    }
}
