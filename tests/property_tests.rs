//! Property-based tests over invariants the cache manager, probability
//! graph, and call window must hold for any input, not just the
//! hand-picked examples in the unit tests.

use proptest::prelude::*;

use predictive_cache_sim::cache::{Page, PageBuffer};
use predictive_cache_sim::graph::ProbabilityGraph;
use predictive_cache_sim::manager::CacheManager;
use predictive_cache_sim::trace::{Call, CallKind, WallTime};
use predictive_cache_sim::window::CallWindow;

fn open(path: String, bytes: u64, micros: u32) -> Call {
    Call::new(CallKind::Open, path, bytes, WallTime::new(0, 0, 0, micros), 0)
}

proptest! {
    /// Capacity is always partitioned exactly between the two buffers while
    /// prefetching is on, no matter what sequence of calls is replayed.
    #[test]
    fn capacity_conservation_holds_for_any_replay(
        paths in prop::collection::vec(0usize..6, 1..40),
        byte_sizes in prop::collection::vec(1u64..4096, 1..40),
        total_pages in 8usize..128,
    ) {
        let mut mgr = CacheManager::new(total_pages, 0.5, 10_000, true);
        for (i, p) in paths.iter().enumerate() {
            let bytes = byte_sizes[i % byte_sizes.len()];
            mgr.allocate(&open(format!("/f{p}"), bytes, (i * 37) as u32));
            prop_assert_eq!(
                mgr.cache().inner().capacity() + mgr.prefetch_buffer().inner().capacity(),
                total_pages
            );
        }
    }

    /// A buffer's size never exceeds its capacity, and pages_available
    /// always equals capacity minus size, after any sequence of inserts.
    #[test]
    fn size_bound_holds_for_any_sequence_of_inserts(
        blocks in prop::collection::vec((0usize..4, 1u64..8), 1..60),
        capacity in 1usize..32,
    ) {
        let mut buf = PageBuffer::new(capacity);
        for (path, block_num) in blocks {
            let page = Page::new(open(format!("/f{path}"), 512, 0), block_num, 0.0);
            if buf.pages_available() == 0 {
                buf.evict_oldest();
            }
            buf.insert(page);
            prop_assert!(buf.size() <= buf.capacity());
            prop_assert_eq!(buf.pages_available(), buf.capacity() - buf.size());
        }
    }

    /// A node's total_strength always equals the sum of its window's
    /// strengths, and a node never carries an association to itself, after
    /// mining any set of calls.
    #[test]
    fn graph_totals_and_no_self_loops_hold_after_mining(
        paths in prop::collection::vec(0usize..8, 2..40),
        lookahead_us in 100u64..100_000,
    ) {
        let calls: Vec<Call> = paths
            .iter()
            .enumerate()
            .map(|(i, p)| open(format!("/f{p}"), 512, (i * 113) as u32))
            .collect();

        let mut graph = ProbabilityGraph::new(lookahead_us);
        graph.create_nodes(&calls);
        graph.load_associations(&calls);

        for node in &graph.nodes {
            let sum: u32 = node.window.iter().map(|a| a.strength).sum();
            prop_assert_eq!(sum, node.total_strength);
            for assoc in &node.window {
                prop_assert!(assoc.call.path != node.call.path);
            }
        }
    }

    /// The call window never spans more than its configured lookahead once
    /// it holds at least two calls.
    #[test]
    fn window_span_never_exceeds_lookahead(
        deltas in prop::collection::vec(0u32..2_000, 1..30),
        lookahead_us in 100u64..5_000,
    ) {
        let mut graph = ProbabilityGraph::new(lookahead_us);
        let mut window = CallWindow::new(lookahead_us);
        let mut micros: u64 = 0;
        for (i, delta) in deltas.iter().enumerate() {
            micros += *delta as u64;
            window.insert(open(format!("/f{i}"), 512, micros as u32), &mut graph);
            if let Some(span) = window.span_secs() {
                prop_assert!(span <= lookahead_us as f64 * 1e-6 + 1e-9);
            }
        }
    }

    /// Peeking the hit-ratio EMA never mutates it; persisting it always
    /// matches what was just peeked.
    #[test]
    fn ema_peek_is_idempotent_and_matches_persisted_value(
        hits in 0u64..1000,
        misses in 0u64..1000,
    ) {
        let mut buf = PageBuffer::new(4);
        buf.record_hits(hits);
        buf.record_misses(misses);
        let peeked = buf.get_current_hit_ratio();
        prop_assert_eq!(buf.last_hit_ratio(), 0.0);
        let persisted = buf.update_hit_ratio();
        prop_assert_eq!(peeked, persisted);
        prop_assert_eq!(buf.last_hit_ratio(), persisted);
    }
}
