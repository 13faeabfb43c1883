//! Reporting types
//!
//! Grounded on `original_source/Cache_Manager.h`'s `cacheToString` (which the
//! original leaves commented out) and SPEC_FULL.md §3/§6: a per-call
//! snapshot plus an end-of-run summary.

/// Emitted by the request router after every replayed call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayReport {
    pub cache_hit_ratio: f64,
    pub prefetch_hit_ratio: f64,
    pub cache_capacity: usize,
    pub cache_pages_available: usize,
    pub prefetch_capacity: usize,
    pub prefetch_pages_available: usize,
}

impl std::fmt::Display for ReplayReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cache_hit_ratio={:.4} prefetch_hit_ratio={:.4} cache={}/{} prefetch={}/{}",
            self.cache_hit_ratio,
            self.prefetch_hit_ratio,
            self.cache_capacity - self.cache_pages_available,
            self.cache_capacity,
            self.prefetch_capacity - self.prefetch_pages_available,
            self.prefetch_capacity,
        )
    }
}

/// Aggregated at the end of a replay run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub calls_replayed: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub prefetch_hits: u64,
    pub prefetch_misses: u64,
    pub final_cache_hit_ratio: f64,
    pub final_prefetch_hit_ratio: f64,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "calls={} cache_hits={} cache_misses={} prefetch_hits={} prefetch_misses={} final_cache_hit_ratio={:.4} final_prefetch_hit_ratio={:.4}",
            self.calls_replayed,
            self.cache_hits,
            self.cache_misses,
            self.prefetch_hits,
            self.prefetch_misses,
            self.final_cache_hit_ratio,
            self.final_prefetch_hit_ratio,
        )
    }
}
