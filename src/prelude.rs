pub use crate::builder::PresenceCacheBuilder;
pub use crate::encoder::{PatternEncoder, PatternKey, WILDCARD, decode, encode, normalize};
pub use crate::error::{ConfigError, EncodeError, ReleaseError};
pub use crate::keyspace::{BASE, KeySpace, MAX_KEY, PATTERN_LENGTH};
pub use crate::presence::{CacheState, PresenceCache};
pub use crate::reclaim::{
    MemoryProbe, MemoryStats, ReclamationController, ReleaseOutcome, UnsupportedProbe,
};

#[cfg(feature = "jemalloc")]
pub use crate::reclaim::JemallocProbe;
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::PresenceMetricsSnapshot;
