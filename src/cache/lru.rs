//! LRU demand buffer
//!
//! Grounded on `original_source/Cache_Manager.h`'s `struct Cache`
//! (SPEC_FULL.md §4.4).

use super::buffer::PageBuffer;
use super::page::Page;

#[derive(Debug, Clone)]
pub struct LruBuffer {
    inner: PageBuffer,
}

impl LruBuffer {
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

    /// Evict the oldest page to make room, then insert `page`.
    pub fn evict_and_insert(&mut self, page: Page) -> (bool, Page) {
        self.inner.evict_oldest();
        self.inner.insert(page)
    }
}
