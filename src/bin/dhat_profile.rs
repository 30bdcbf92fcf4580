//! DHAT heap profiler for presencekit.
//!
//! Run with: cargo run --bin dhat_profile --release --features dhat-heap
//! View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use presencekit::encoder::{PatternEncoder, PatternKey};
use presencekit::presence::PresenceCache;

/// Simple XorShift64 RNG for deterministic workloads.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

/// Insert `operations` random patterns drawn from the whole key space.
fn random_fill(cache: &PresenceCache, operations: usize, seed: u64) {
    let encoder = PatternEncoder::new(cache.key_space());
    let max_key = cache.key_space().max_key();
    let mut rng = XorShift64::new(seed);
    for _ in 0..operations {
        let key = PatternKey::new(rng.next_u64() % max_key);
        let pattern = encoder.decode(key).expect("key in range");
        cache.set(&pattern).expect("decoded pattern is valid");
    }
}

/// Sequential patterns "000000", "000001", ...
fn sequential_fill(cache: &PresenceCache, operations: usize) {
    for i in 0..operations {
        cache
            .set(&format!("{:06}", i % 1_000_000))
            .expect("digit pattern is valid");
    }
}

fn profile_presized() {
    println!("=== Profiling pre-sized cache (whole key space) ===");
    let cache = PresenceCache::new(0);

    for generation in 0..4u64 {
        random_fill(&cache, 100_000, 42 + generation);
        println!("  generation {generation}: len={}", cache.len());
        cache.clear();
    }
    println!("  retained capacity after clears: {}", cache.retained_capacity());

    cache.free();
    println!("  retained capacity after free: {}", cache.retained_capacity());
}

fn profile_growing() {
    println!("=== Profiling growing cache (small hint) ===");
    let cache = PresenceCache::new(16);

    sequential_fill(&cache, 200_000);
    println!("  len={} capacity={}", cache.len(), cache.retained_capacity());

    // Released storage is rebuilt from zero capacity.
    cache.free();
    sequential_fill(&cache, 50_000);
    println!(
        "  after free + refill: len={} capacity={}",
        cache.len(),
        cache.retained_capacity()
    );
}

fn main() {
    let _profiler = dhat::Profiler::new_heap();

    println!("presencekit DHAT Heap Profiling");
    println!("===============================\n");

    profile_presized();
    profile_growing();

    println!("\n===============================");
    println!("Profiling complete!");
    println!(
        "View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>"
    );
}
