//! Cache manager: admission, prefetching with pipeline detection, and
//! adaptive repartitioning.
//!
//! Grounded on `original_source/Cache_Manager.h`'s `Cache_Manager` class
//! (`allocate`, `lruAllocate`, `prefetchAllocate`, `prefetch`, `pipeline`,
//! `matrix_check`) with the admission/accounting semantics SPEC_FULL.md
//! §4.6-§4.8 resolves them to (per-block accounting, stamp-age hit rule).

use tracing::debug;

use crate::cache::{LruBuffer, Page, PrefetchBuffer};
use crate::clock::{Clock, SimClock};
use crate::constants::{prefetch_horizon, prefetch_ttl_us, t_disk_secs, BLOCK_SIZE, EPSILON, PIPELINE_STRENGTH_THRESHOLD};
use crate::graph::{Node, ProbabilityGraph};
use crate::report::ReplayReport;
use crate::trace::Call;
use crate::window::CallWindow;

fn blocks_for(bytes: u64) -> u64 {
    bytes.div_ceil(BLOCK_SIZE)
}

pub struct CacheManager<C: SimClock = Clock> {
    clock: C,
    graph: ProbabilityGraph,
    window: CallWindow,
    cache: LruBuffer,
    prefetch: PrefetchBuffer,
    prefetching_enabled: bool,
    minimum_chance: f64,
    total_pages: usize,
    last_hit_ratio_update: Option<f64>,
}

impl CacheManager<Clock> {
    pub fn new(
        total_pages: usize,
        minimum_chance: f64,
        lookahead_window_us: u64,
        prefetching_enabled: bool,
    ) -> Self {
        Self::with_clock(
            Clock::new(),
            total_pages,
            minimum_chance,
            lookahead_window_us,
            prefetching_enabled,
        )
    }
}

impl<C: SimClock> CacheManager<C> {
    pub fn with_clock(
        clock: C,
        total_pages: usize,
        minimum_chance: f64,
        lookahead_window_us: u64,
        prefetching_enabled: bool,
    ) -> Self {
        let prefetch_cap = if prefetching_enabled {
            prefetch_horizon().min(total_pages.saturating_sub(1)).max(1)
        } else {
            0
        };
        let cache_cap = total_pages.saturating_sub(prefetch_cap);
        Self {
            clock,
            graph: ProbabilityGraph::new(lookahead_window_us),
            window: CallWindow::new(lookahead_window_us),
            cache: LruBuffer::new(cache_cap),
            prefetch: PrefetchBuffer::new(prefetch_cap),
            prefetching_enabled,
            minimum_chance,
            total_pages,
            last_hit_ratio_update: None,
        }
    }

    /// Replace the graph, e.g. after training it from a prior trace.
    pub fn set_graph(&mut self, graph: ProbabilityGraph) {
        self.graph = graph;
    }

    pub fn graph(&self) -> &ProbabilityGraph {
        &self.graph
    }

    pub fn cache(&self) -> &LruBuffer {
        &self.cache
    }

    pub fn prefetch_buffer(&self) -> &PrefetchBuffer {
        &self.prefetch
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// `allocate(call)`: the cache manager's entire admission protocol for
    /// one replayed call (SPEC_FULL.md §4.6).
    pub fn allocate(&mut self, call: &Call) -> bool {
        self.update_hit_ratios();

        if !self.prefetching_enabled {
            return self.lru_allocate(call, false);
        }

        self.window.insert(call.clone(), &mut self.graph);
        self.prefetch(call);

        let drained = self.prefetch.inner().pages_for(&call.path);
        let is_prefetched = if drained.is_empty() {
            false
        } else {
            let now = self.clock.now();
            let aged = drained.iter().any(|p| now - p.stamp >= t_disk_secs());
            let blocks = blocks_for(call.bytes);
            if aged {
                self.prefetch.inner_mut().record_hits(blocks);
            } else {
                self.prefetch.inner_mut().record_misses(blocks);
            }
            for page in &drained {
                self.prefetch.inner_mut().remove(page);
            }
            aged
        };

        self.lru_allocate(call, is_prefetched)
    }

    /// Recompute and persist both EMAs once at least 100us has elapsed.
    fn update_hit_ratios(&mut self) {
        let now = self.clock.now();
        let due = match self.last_hit_ratio_update {
            None => true,
            Some(last) => (now - last) * 1e6 >= crate::constants::HIT_RATIO_REFRESH_US,
        };
        if due {
            self.cache.inner_mut().update_hit_ratio();
            self.prefetch.inner_mut().update_hit_ratio();
            self.last_hit_ratio_update = Some(now);
        }
    }

    /// `lru_allocate(call, is_prefetched)` (SPEC_FULL.md §4.6): admit every
    /// block of `call` into the LRU buffer, returning true iff the *last*
    /// block admitted was a cache hit.
    fn lru_allocate(&mut self, call: &Call, is_prefetched: bool) -> bool {
        let blocks = blocks_for(call.bytes);
        let mut last_hit = false;
        for block_num in 1..=blocks {
            let stamp = if is_prefetched {
                self.clock.prefetch_stamp()
            } else {
                self.clock.now()
            };
            let page = Page::new(call.clone(), block_num, stamp);
            last_hit = self.admit_cache_block(page);
        }
        last_hit
    }

    fn admit_cache_block(&mut self, page: Page) -> bool {
        if self.cache.inner().pages_available() == 0 && self.prefetching_enabled {
            self.repartition();
        }
        let now = self.clock.now();
        if self.cache.inner().pages_available() > 0 {
            let (was_new, stored) = self.cache.inner_mut().insert(page);
            Self::record_admission(self.cache.inner_mut(), was_new, &stored, now)
        } else {
            let (was_new, stored) = self.cache.evict_and_insert(page);
            Self::record_admission(self.cache.inner_mut(), was_new, &stored, now)
        }
    }

    fn record_admission(buffer: &mut crate::cache::PageBuffer, was_new: bool, stored: &Page, now: f64) -> bool {
        if was_new {
            buffer.record_misses(1);
            false
        } else if now - stored.stamp >= t_disk_secs() {
            buffer.record_hits(1);
            true
        } else {
            buffer.record_misses(1);
            false
        }
    }

    /// `prefetch(call)` (SPEC_FULL.md §4.7): pipeline detection first, then
    /// the minimum-chance filter over whatever the pipeline run didn't
    /// already absorb.
    fn prefetch(&mut self, call: &Call) {
        let node = match self.graph.find(call) {
            Some(n) => n.clone(),
            None => {
                debug!(path = %call.path, "graph miss, nothing to prefetch");
                return;
            }
        };

        let runs = Self::pipeline_runs(&self.graph, &node);
        for (start, end) in &runs {
            for assoc in &node.window[*start..=*end] {
                self.admit_all_blocks(&assoc.call);
            }
        }

        if node.total_strength == 0 {
            return;
        }
        for (idx, assoc) in node.window.iter().enumerate() {
            if runs.iter().any(|(s, e)| idx >= *s && idx <= *e) {
                continue;
            }
            let chance = assoc.strength as f64 / node.total_strength as f64;
            if chance >= self.minimum_chance
                && !self.prefetch.inner().contains_path(&assoc.call.path)
                && !self.cache.inner().contains_path(&assoc.call.path)
            {
                self.admit_all_blocks(&assoc.call);
            }
        }
    }

    fn admit_all_blocks(&mut self, call: &Call) {
        let blocks = blocks_for(call.bytes);
        for block_num in 1..=blocks {
            let stamp = self.clock.now();
            self.prefetch_allocate(Page::new(call.clone(), block_num, stamp));
        }
    }

    /// `prefetch_allocate(page)`: skip if already authoritatively cached,
    /// else admit, trying TTL eviction then repartition on overflow.
    fn prefetch_allocate(&mut self, page: Page) -> bool {
        if self.cache.inner().contains(&page) {
            return false;
        }
        if self.prefetch.inner().pages_available() == 0 {
            let now = self.clock.now();
            let ttl = prefetch_ttl_us() * 1e-6;
            if !self.prefetch.try_ttl_evict(now, ttl) {
                self.repartition();
            }
        }
        if self.prefetch.inner().pages_available() > 0 {
            self.prefetch.inner_mut().insert(page);
            true
        } else {
            false
        }
    }

    /// Walk the node's window for contiguous runs whose strength exceeds
    /// `PIPELINE_STRENGTH_THRESHOLD`, accept by length + cumulative-strength
    /// share, and confirm with the triangular-matrix test (SPEC_FULL.md
    /// §4.7 steps 1-3).
    fn pipeline_runs(graph: &ProbabilityGraph, node: &Node) -> Vec<(usize, usize)> {
        let horizon = prefetch_horizon();
        let mut runs = Vec::new();
        if node.window.is_empty() || node.total_strength == 0 {
            return runs;
        }
        let mut i = 0;
        while i < node.window.len() {
            let strength = node.window[i].strength;
            if strength > PIPELINE_STRENGTH_THRESHOLD {
                let limit = (i + horizon).min(node.window.len());
                let mut j = i;
                while j + 1 < limit && node.window[j + 1].strength == strength {
                    j += 1;
                }
                let run_len = j - i + 1;
                let cumulative: u32 = node.window[i..=j].iter().map(|a| a.strength).sum();
                if run_len >= horizon
                    && cumulative as f64 / node.total_strength as f64 >= 0.5
                    && Self::matrix_check(graph, node, i, j)
                {
                    runs.push((i, j));
                    i = j + 1;
                    continue;
                }
            }
            i += 1;
        }
        runs
    }

    /// `matrix_check(node, start, end)`: for each call in the run, look up
    /// its own node and count associations whose file appears anywhere in
    /// `node.window` with a matching strength. Accepted iff these row
    /// counts are strictly decreasing.
    fn matrix_check(graph: &ProbabilityGraph, node: &Node, start: usize, end: usize) -> bool {
        let mut previous: Option<usize> = None;
        for idx in start..=end {
            let target_call = &node.window[idx].call;
            let target_node = match graph.find(target_call) {
                Some(n) => n,
                None => return false,
            };
            let count = target_node
                .window
                .iter()
                .filter(|assoc| {
                    node.window
                        .iter()
                        .any(|orig| orig.call.path == assoc.call.path && orig.strength == assoc.strength)
                })
                .count();
            if let Some(prev) = previous {
                if count >= prev {
                    return false;
                }
            }
            previous = Some(count);
        }
        true
    }

    /// `repartition()` (SPEC_FULL.md §4.8).
    fn repartition(&mut self) {
        let prefetch_current = self.prefetch.inner().get_current_hit_ratio();
        let prefetch_last = self.prefetch.inner().last_hit_ratio();
        let cache_current = self.cache.inner().get_current_hit_ratio();
        let cache_last = self.cache.inner().last_hit_ratio();
        let delta = prefetch_current - prefetch_last;
        let theta = cache_current - cache_last;

        let horizon = prefetch_horizon();
        let total = self.total_pages;
        let ten_percent = ((0.1 * total as f64).floor() as usize).max(horizon);

        if delta.abs() <= EPSILON && theta.abs() <= EPSILON {
            let avg_fanout = if self.graph.node_count() > 0 {
                self.graph.association_count() as f64 / self.graph.node_count() as f64
            } else {
                0.0
            };
            let optimal = (avg_fanout * horizon as f64 * prefetch_current).round().max(0.0) as usize;
            let new_cap = optimal.clamp(horizon, ten_percent);
            self.apply_capacities(new_cap);
        } else if delta < theta {
            let new_cap = self.prefetch.inner().capacity().saturating_sub(1).max(horizon);
            self.apply_capacities(new_cap);
            self.minimum_chance = (self.minimum_chance + 0.1).min(0.9);
        } else if delta > theta {
            let new_cap = (self.prefetch.inner().capacity() + 1).min(ten_percent);
            self.apply_capacities(new_cap);
            self.minimum_chance = (self.minimum_chance - 0.1).max(0.3);
        }

        if delta > 0.0 {
            self.minimum_chance = (self.minimum_chance + 0.1).min(0.9);
        } else if delta < 0.0 {
            self.minimum_chance = (self.minimum_chance - 0.1).max(0.3);
        }
    }

    fn apply_capacities(&mut self, new_prefetch_cap: usize) {
        let ceiling = self.total_pages.saturating_sub(1).max(1);
        let new_prefetch_cap = new_prefetch_cap.min(ceiling).max(1);
        let new_cache_cap = self.total_pages - new_prefetch_cap;
        self.prefetch.inner_mut().set_capacity(new_prefetch_cap);
        self.cache.inner_mut().set_capacity(new_cache_cap);
        self.prefetch.inner_mut().trim_to_capacity();
        self.cache.inner_mut().trim_to_capacity();
    }

    pub fn report(&self) -> ReplayReport {
        ReplayReport {
            cache_hit_ratio: self.cache.inner().last_hit_ratio(),
            prefetch_hit_ratio: self.prefetch.inner().last_hit_ratio(),
            cache_capacity: self.cache.inner().capacity(),
            cache_pages_available: self.cache.inner().pages_available(),
            prefetch_capacity: self.prefetch.inner().capacity(),
            prefetch_pages_available: self.prefetch.inner().pages_available(),
        }
    }
}
