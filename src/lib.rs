//! presencekit: fixed-length pattern encoding and a concurrent presence cache.
//!
//! Patterns of digits and wildcards are folded into dense integer keys
//! ([`encoder`]), recorded in a lock-guarded set ([`presence`]), and released
//! back to the allocator and OS on demand ([`reclaim`]).
//!
//! ```
//! use presencekit::prelude::*;
//!
//! let cache = PresenceCache::new(1000);
//! for i in 0..1000 {
//!     cache.set(&format!("{i:06}")).unwrap();
//! }
//! assert!(cache.exists("000500").unwrap());
//! assert!(!cache.exists("999999").unwrap());
//! assert_eq!(cache.len(), 1000);
//! ```

pub mod builder;
pub mod encoder;
pub mod error;
pub mod keyspace;
pub mod presence;
pub mod reclaim;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
