//! jemalloc-backed [`MemoryProbe`].

use std::ptr;

use tikv_jemalloc_ctl::{epoch, stats};
use tracing::warn;

use super::{MemoryProbe, MemoryStats};

/// `MALLCTL_ARENAS_ALL`: addresses every arena at once.
const PURGE_ALL_ARENAS: &[u8] = b"arena.4096.purge\0";

/// Reads jemalloc statistics and purges dirty pages on request.
///
/// The numbers describe jemalloc's heap, so they only reflect the cache when
/// jemalloc is the global allocator:
///
/// ```ignore
/// #[global_allocator]
/// static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;
/// ```
///
/// `returned_to_os` counts mapped-but-not-resident pages (purged) plus
/// retained virtual memory (unmapped but kept for reuse).
#[derive(Debug, Clone, Copy, Default)]
pub struct JemallocProbe;

impl MemoryProbe for JemallocProbe {
    fn stats(&self) -> Option<MemoryStats> {
        let allocated = stats::allocated::read().ok()?;
        let mapped = stats::mapped::read().ok()?;
        let resident = stats::resident::read().ok()?;
        let retained = stats::retained::read().ok()?;
        Some(MemoryStats {
            allocated: allocated as u64,
            obtained_from_os: mapped as u64,
            returned_to_os: (mapped.saturating_sub(resident) + retained) as u64,
        })
    }

    fn collect(&self) {
        // Statistics are cached until the epoch advances.
        if let Err(err) = epoch::advance() {
            warn!(error = %err, "failed to advance jemalloc epoch");
        }
    }

    fn release_to_os(&self) {
        // SAFETY: `arena.<i>.purge` is a void control: it reads and writes
        // nothing, so all value pointers are null with zero length. The name
        // is NUL-terminated.
        let rc = unsafe {
            tikv_jemalloc_sys::mallctl(
                PURGE_ALL_ARENAS.as_ptr().cast(),
                ptr::null_mut(),
                ptr::null_mut(),
                ptr::null_mut(),
                0,
            )
        };
        if rc != 0 {
            warn!(rc, "jemalloc arena purge failed");
        }
    }
}
