//! Operation counters for [`PresenceCache`](crate::presence::PresenceCache).
//!
//! Enabled with the `metrics` feature. Recording, snapshotting and export are
//! split the same way as the cache API: the cache records through
//! [`PresenceMetricsRecorder`](traits::PresenceMetricsRecorder), callers read
//! through [`MetricsSnapshotProvider`](traits::MetricsSnapshotProvider), and
//! monitoring publishes through [`MetricsExporter`](traits::MetricsExporter).

pub(crate) mod counters;
pub mod exporter;
pub mod snapshot;
pub mod traits;
