//! Walks a presence cache through its lifecycle: sets, soft reset, refill,
//! and hard release with OS confirmation.
//!
//! Run with: cargo run --example lifecycle
//! With allocator accounting: cargo run --example lifecycle --features jemalloc
//! Verbose: RUST_LOG=presencekit=debug cargo run --example lifecycle

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::time::Duration;

use presencekit::presence::PresenceCache;
use presencekit::reclaim::{DefaultProbe, MemoryProbe, ReleaseOutcome};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn report(probe: &DefaultProbe, label: &str) {
    probe.collect();
    match probe.stats() {
        Some(stats) => info!(%stats, "[{label}]"),
        None => info!("[{label}] memory accounting unavailable"),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let probe = DefaultProbe::default();
    let cache = PresenceCache::new(0);
    info!(capacity_hint = cache.capacity_hint(), "created cache");
    report(&probe, "initial");

    let samples = ["1-3-56", "0--3-5", "------", "123456", "1\u{2013}3-56", "12x456"];
    for pattern in samples {
        match cache.set(pattern) {
            Ok(()) => {
                let exists = cache.exists(pattern).unwrap_or(false);
                info!(pattern, exists, "set");
            },
            Err(err) => warn!(pattern, error = %err, "set failed"),
        }
    }
    report(&probe, "after sets");

    cache.clear();
    report(&probe, "after clear (capacity kept)");

    for i in 0..1000 {
        if let Err(err) = cache.set(&format!("{i:06}")) {
            warn!(error = %err, "refill failed");
        }
    }
    report(&probe, "after refill 1000");

    info!("releasing storage (5s timeout)");
    match cache.release_and_confirm(Duration::from_secs(5)) {
        Ok(ReleaseOutcome::Confirmed { before, after }) => {
            info!(%before, %after, "memory release observed")
        },
        Ok(ReleaseOutcome::Unsupported) => {
            info!("storage freed; no allocator accounting to confirm with")
        },
        Err(err) => warn!(error = %err, "release not confirmed"),
    }
    report(&probe, "after release");
}
