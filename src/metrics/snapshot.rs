/// Point-in-time view of a presence cache's counters and gauges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PresenceMetricsSnapshot {
    pub set_calls: u64,
    pub set_new: u64,
    pub set_duplicate: u64,

    pub exists_calls: u64,
    pub exists_hits: u64,
    pub exists_misses: u64,

    pub encode_errors: u64,

    pub clear_calls: u64,
    pub free_calls: u64,
    pub reallocations: u64, // storage re-created after free

    pub releases_confirmed: u64,
    pub releases_unsupported: u64,
    pub release_timeouts: u64,

    // gauges captured at snapshot time
    pub len: usize,
    pub retained_capacity: usize,
    pub capacity_hint: usize,
}

impl PresenceMetricsSnapshot {
    /// Fraction of presence queries that found their key.
    pub fn exists_hit_ratio(&self) -> f64 {
        if self.exists_calls == 0 {
            0.0
        } else {
            self.exists_hits as f64 / self.exists_calls as f64
        }
    }
}
