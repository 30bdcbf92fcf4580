//! # Metrics Traits
//!
//! ```text
//!   ┌──────────────────────────────┐
//!   │   PresenceMetricsRecorder    │   written by the cache (&self, atomics)
//!   └──────────────┬───────────────┘
//!                  │
//!   Consumption (decoupled from recording):
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsExporter<S>           │
//!   │ (bench/test)                 │    │ (production monitoring)      │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```
//!
//! Recorders take `&self` because cache reads only hold a shared lock.

use crate::error::ReleaseError;
use crate::reclaim::ReleaseOutcome;

/// Counters written by the presence cache.
pub trait PresenceMetricsRecorder {
    /// A key was inserted; `added` is `false` for duplicates.
    fn record_set(&self, added: bool);
    /// A presence query completed.
    fn record_exists(&self, found: bool);
    /// A pattern or key was rejected by the encoder.
    fn record_encode_error(&self);
    fn record_clear(&self);
    fn record_free(&self);
    /// Storage was re-created after a release.
    fn record_reallocation(&self);
    fn record_release(&self, outcome: Result<&ReleaseOutcome, &ReleaseError>);
}

/// Snapshot provider for bench/testing.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&self);
}

/// Export/publish metrics to production monitoring backends.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
