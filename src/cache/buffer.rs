//! Shared ordered-page-set mechanics
//!
//! Grounded on `original_source/Cache_Manager.h`'s `Cache`/`Prefetch`
//! structs, which share the same `set<Page, pageComparison>` shape and
//! hit-ratio bookkeeping and differ only in their eviction policy
//! (SPEC_FULL.md §4.4/§4.5). `LruBuffer` and `PrefetchBuffer` each wrap one
//! of these and add their own eviction strategy.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::constants::GAMMA;

use super::page::Page;

#[derive(Debug, Clone)]
pub struct PageBuffer {
    capacity: usize,
    pages: BTreeSet<Page>,
    hits: u64,
    misses: u64,
    last_hit_ratio: f64,
}

impl PageBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            pages: BTreeSet::new(),
            hits: 0,
            misses: 0,
            last_hit_ratio: 0.0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    pub fn size(&self) -> usize {
        self.pages.len()
    }

    pub fn pages_available(&self) -> usize {
        self.capacity.saturating_sub(self.size())
    }

    pub fn is_full(&self) -> bool {
        self.size() >= self.capacity
    }

    /// Insert `page`. Returns `(was_new, stored_page)`: if a page keyed by
    /// the same `(path, block_num)` already existed, it is left untouched
    /// and returned so the caller can inspect its (older) stamp.
    pub fn insert(&mut self, page: Page) -> (bool, Page) {
        if let Some(existing) = self.pages.get(&page) {
            (false, existing.clone())
        } else {
            let stored = page.clone();
            self.pages.insert(page);
            (true, stored)
        }
    }

    pub fn remove(&mut self, page: &Page) -> bool {
        self.pages.remove(page)
    }

    /// The oldest-stamped page across all files (the LRU victim), without
    /// removing it. `Page`'s `Ord` is keyed by identity, not recency, so
    /// this is a scan rather than `BTreeSet`'s own iteration order.
    pub fn peek_oldest(&self) -> Option<&Page> {
        self.pages
            .iter()
            .min_by(|a, b| a.stamp.partial_cmp(&b.stamp).unwrap_or(Ordering::Equal))
    }

    /// Pop the oldest-stamped page across all files (the LRU victim).
    pub fn evict_oldest(&mut self) -> Option<Page> {
        let victim = self.peek_oldest().cloned();
        if let Some(ref v) = victim {
            self.pages.remove(v);
        }
        victim
    }

    /// Every page currently stored for `path`, ascending by block_num.
    pub fn pages_for(&self, path: &str) -> Vec<Page> {
        let mut found: Vec<Page> = self
            .pages
            .iter()
            .filter(|p| &*p.file.path == path)
            .cloned()
            .collect();
        found.sort_by_key(|p| p.block_num);
        found
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.pages.iter().any(|p| &*p.file.path == path)
    }

    /// Exact `(path, block_num)` membership test.
    pub fn contains(&self, page: &Page) -> bool {
        self.pages.contains(page)
    }

    /// Evict from the head until `size() <= capacity`, handing back what was
    /// dropped (used by repartition to reclaim pages for the other buffer).
    pub fn trim_to_capacity(&mut self) -> Vec<Page> {
        let mut dropped = Vec::new();
        while self.size() > self.capacity {
            match self.evict_oldest() {
                Some(p) => dropped.push(p),
                None => break,
            }
        }
        dropped
    }

    pub fn record_hits(&mut self, n: u64) {
        self.hits += n;
    }

    pub fn record_misses(&mut self, n: u64) {
        self.misses += n;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn last_hit_ratio(&self) -> f64 {
        self.last_hit_ratio
    }

    fn current_sample(&self) -> f64 {
        let total = (self.hits + self.misses) as f64;
        if total == 0.0 {
            0.0
        } else {
            self.hits as f64 / total
        }
    }

    /// The EMA as it would read right now, without persisting it.
    pub fn get_current_hit_ratio(&self) -> f64 {
        (1.0 - GAMMA) * self.last_hit_ratio + GAMMA * self.current_sample()
    }

    /// Recompute and persist the EMA (SPEC_FULL.md §9: unconditional store).
    pub fn update_hit_ratio(&mut self) -> f64 {
        let updated = self.get_current_hit_ratio();
        self.last_hit_ratio = updated;
        updated
    }
}
