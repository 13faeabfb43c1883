//! Simulation-wide tunables
//!
//! All latencies are in microseconds, matching the original `Cache_Manager.h`
//! (`#define t_disk ...` etc). `BLOCK_SIZE` and `PREFETCH_TTL` resolve the two
//! source variants in favor of the 512-byte block / `t_disk + t_cpu` pairing
//! (SPEC_FULL.md §9, open question (a)).

/// Bytes per page.
pub const BLOCK_SIZE: u64 = 512;

/// Modelled storage-access latency, in microseconds.
pub const T_DISK: f64 = 10_000.0;
/// Modelled inter-syscall CPU time, in microseconds.
pub const T_CPU: f64 = 1_000.0;
/// Modelled time to read a few KB out of cache, in microseconds.
pub const T_HIT: f64 = 50.0;
/// Modelled time to allocate a fresh page, in microseconds.
pub const T_DRIVER: f64 = 500.0;

/// Smoothing factor for the weighted moving hit-ratio average.
pub const GAMMA: f64 = 0.25;

/// Tolerance below which a hit-ratio delta is treated as zero (repartition stability test).
pub const EPSILON: f64 = 1e-13;

/// Minimum association strength a pipeline candidate run must start from.
pub const PIPELINE_STRENGTH_THRESHOLD: u32 = 5;

/// Minimum gap, in microseconds, between successive hit-ratio EMA refreshes.
pub const HIT_RATIO_REFRESH_US: f64 = 100.0;

/// Number of concurrent prefetches sized to cover one disk latency.
pub fn prefetch_horizon() -> usize {
    (T_DISK / (T_CPU + T_HIT + T_DRIVER)).floor() as usize
}

/// Maximum age, in microseconds, a prefetched page may sit unclaimed before TTL eviction.
pub fn prefetch_ttl_us() -> f64 {
    T_DISK + T_CPU
}

/// `t_disk` expressed in seconds, for comparison against page stamps.
pub fn t_disk_secs() -> f64 {
    T_DISK * 1e-6
}
