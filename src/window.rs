//! Call window — online graph mutation
//!
//! Grounded on `original_source/Cache_Manager.h`'s `struct CallWindow`: a
//! short sliding window of recent calls that mutates the probability graph
//! on every arrival, so the graph keeps learning associations as the replay
//! proceeds instead of being frozen after an initial training pass
//! (SPEC_FULL.md §4.3).

use std::collections::VecDeque;

use crate::graph::{Association, Node, ProbabilityGraph};
use crate::trace::Call;

pub struct CallWindow {
    lookahead_secs: f64,
    calls: VecDeque<Call>,
}

impl CallWindow {
    pub fn new(lookahead_window_us: u64) -> Self {
        Self {
            lookahead_secs: lookahead_window_us as f64 * 1e-6,
            calls: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Time between the oldest and newest call currently held, or `None`
    /// when fewer than two calls are in the window.
    pub fn span_secs(&self) -> Option<f64> {
        if self.calls.len() < 2 {
            return None;
        }
        let last = self.calls.back().unwrap().wall_time;
        let first = self.calls.front().unwrap().wall_time;
        Some(last - first)
    }

    /// Fold a new call into the graph and the window.
    pub fn insert(&mut self, call: Call, graph: &mut ProbabilityGraph) {
        if graph.find(&call).is_none() {
            graph.nodes.push(Node::new(call.clone()));
            self.backfill_associations(&call, graph);
        } else {
            self.backfill_associations(&call, graph);
            // Rebuild the node so its `call` reference points at the newest
            // instance while keeping its accumulated window/total_strength.
            if let Some(node) = graph.find_mut(&call) {
                node.call = call.clone();
            }
        }

        self.calls.push_back(call);
        self.trim();
    }

    /// Append a pending association for `call` to every node already in the
    /// window (skipping a node that matches `call` itself).
    fn backfill_associations(&self, call: &Call, graph: &mut ProbabilityGraph) {
        if self.calls.len() < 2 {
            return;
        }
        for existing in &self.calls {
            if let Some(node) = graph.find_mut(existing) {
                node.push_association(Association::new(call.clone()));
                node.dedup_window();
            }
        }
    }

    /// Evict from the head while the window spans more than the lookahead.
    fn trim(&mut self) {
        while self.calls.len() > 1 {
            let last = self.calls.back().unwrap().wall_time;
            let first = self.calls.front().unwrap().wall_time;
            if last - first > self.lookahead_secs {
                self.calls.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{CallKind, WallTime};

    fn open(path: &str, us: u32) -> Call {
        Call::new(CallKind::Open, path, 512, WallTime::new(0, 0, 0, us), 0)
    }

    #[test]
    fn backfill_only_fires_once_two_earlier_calls_are_in_the_window() {
        // At B's insertion the window holds only {A} (size 1), so no
        // backfill happens yet. At C's insertion the window holds {A, B}
        // (size 2), so both A and B pick up an association to C.
        let mut graph = ProbabilityGraph::new(10_000_000);
        let mut window = CallWindow::new(10_000_000);

        window.insert(open("A", 0), &mut graph);
        window.insert(open("B", 10), &mut graph);
        window.insert(open("C", 20), &mut graph);

        let node_a = graph.find(&open("A", 0)).unwrap();
        assert!(!node_a.window.iter().any(|a| &*a.call.path == "B"));
        assert!(node_a.window.iter().any(|a| &*a.call.path == "C"));

        let node_b = graph.find(&open("B", 0)).unwrap();
        assert!(node_b.window.iter().any(|a| &*a.call.path == "C"));
    }

    #[test]
    fn window_duration_invariant_holds() {
        let mut graph = ProbabilityGraph::new(1_000); // 1000us lookahead
        let mut window = CallWindow::new(1_000);

        window.insert(open("A", 0), &mut graph);
        window.insert(open("B", 500), &mut graph);
        window.insert(open("C", 1_200), &mut graph);

        // C's insertion should have evicted A, since C - A > 1000us.
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn repeated_file_rebuilds_node_without_losing_window() {
        // Re-inserting A (window holds {A, B}, size 2) skips self-association
        // for A's own node but gives B's node a fresh association to A.
        let mut graph = ProbabilityGraph::new(10_000_000);
        let mut window = CallWindow::new(10_000_000);

        window.insert(open("A", 0), &mut graph);
        window.insert(open("B", 10), &mut graph);
        window.insert(open("A", 20), &mut graph);

        let node_a = graph.find(&open("A", 0)).unwrap();
        assert!(!node_a.window.iter().any(|a| &*a.call.path == "A"));

        let node_b = graph.find(&open("B", 0)).unwrap();
        assert!(node_b.window.iter().any(|a| &*a.call.path == "A"));
    }
}
