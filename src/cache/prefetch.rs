//! Prefetch buffer
//!
//! Grounded on `original_source/Cache_Manager.h`'s `struct Prefetch`:
//! same page-set shape as the LRU buffer, but eviction tries a TTL expiry
//! before the cache manager falls back to repartitioning (SPEC_FULL.md
//! §4.5).

use super::buffer::PageBuffer;

#[derive(Debug, Clone)]
pub struct PrefetchBuffer {
    inner: PageBuffer,
}

impl PrefetchBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: PageBuffer::new(capacity),
        }
    }

    pub fn inner(&self) -> &PageBuffer {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut PageBuffer {
        &mut self.inner
    }

    /// If the oldest page's age exceeds `ttl_secs`, evict it and report
    /// success so the caller can retry admission.
    pub fn try_ttl_evict(&mut self, now: f64, ttl_secs: f64) -> bool {
        match self.inner.peek_oldest() {
            Some(oldest) if now - oldest.stamp > ttl_secs => {
                self.inner.evict_oldest();
                true
            }
            _ => false,
        }
    }
}
